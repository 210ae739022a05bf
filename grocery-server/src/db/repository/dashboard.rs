//! Dashboard Repository (back-office figures)

use super::{RepoResult, order};
use shared::models::DashboardStats;
use sqlx::SqlitePool;

const RECENT_ORDERS: i64 = 5;

#[derive(sqlx::FromRow)]
struct OrderFigures {
    total_orders: i64,
    pending_orders: i64,
    total_revenue: f64,
    today_orders: i64,
    today_revenue: f64,
}

#[derive(sqlx::FromRow)]
struct CatalogFigures {
    total_products: i64,
    active_products: i64,
    total_customers: i64,
}

/// Aggregate figures. `today_start` is the Unix millisecond at which "today" began.
pub async fn stats(pool: &SqlitePool, today_start: i64) -> RepoResult<DashboardStats> {
    let orders = sqlx::query_as::<_, OrderFigures>(
        "SELECT COUNT(*) AS total_orders, \
         COALESCE(SUM(CASE WHEN status = 'pending' THEN 1 ELSE 0 END), 0) AS pending_orders, \
         COALESCE(SUM(CASE WHEN status = 'delivered' THEN total ELSE 0.0 END), 0.0) AS total_revenue, \
         COALESCE(SUM(CASE WHEN created_at >= ?1 THEN 1 ELSE 0 END), 0) AS today_orders, \
         COALESCE(SUM(CASE WHEN created_at >= ?1 THEN total ELSE 0.0 END), 0.0) AS today_revenue \
         FROM orders",
    )
    .bind(today_start)
    .fetch_one(pool)
    .await?;

    let catalog = sqlx::query_as::<_, CatalogFigures>(
        "SELECT (SELECT COUNT(*) FROM product) AS total_products, \
         (SELECT COUNT(*) FROM product WHERE is_active = 1) AS active_products, \
         (SELECT COUNT(*) FROM profile WHERE role = 'customer') AS total_customers",
    )
    .fetch_one(pool)
    .await?;

    let recent_orders = order::find_all(pool, None, Some(RECENT_ORDERS)).await?;

    Ok(DashboardStats {
        total_orders: orders.total_orders,
        pending_orders: orders.pending_orders,
        total_products: catalog.total_products,
        active_products: catalog.active_products,
        total_customers: catalog.total_customers,
        total_revenue: orders.total_revenue,
        today_orders: orders.today_orders,
        today_revenue: orders.today_revenue,
        recent_orders,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing;

    #[tokio::test]
    async fn empty_store_is_all_zero() {
        let pool = testing::pool().await;
        let s = stats(&pool, 0).await.unwrap();
        assert_eq!(s.total_orders, 0);
        assert_eq!(s.total_revenue, 0.0);
        assert!(s.recent_orders.is_empty());
    }
}
