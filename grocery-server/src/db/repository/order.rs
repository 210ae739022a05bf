//! Order Repository
//!
//! Reads take the pool; writes take a connection so checkout and the
//! lifecycle service can group them in one transaction.

use super::{RepoError, RepoResult};
use shared::models::{
    DeliveryAddress, Order, OrderDetail, OrderItem, OrderStatusChange, Role,
};
use shared::order::{OrderStatus, PaymentMethod, PaymentStatus, Transition};
use shared::util::snowflake_id;
use sqlx::types::Json;
use sqlx::{SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, order_number, user_id, status, subtotal, delivery_fee, discount, total, \
    delivery_address, payment_method, payment_status, notes, customer_name, customer_email, \
    customer_phone, rider_id, estimated_delivery, delivered_at, version, idempotency_key, \
    created_at, updated_at";

const ITEM_COLUMNS: &str = "id, order_id, product_id, product_name, product_image, unit_price, \
    quantity, total_price, created_at";

const HISTORY_COLUMNS: &str =
    "id, order_id, from_status, to_status, actor_id, actor_role, note, created_at";

/// Everything needed to insert an order row
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: String,
    pub user_id: Option<i64>,
    pub subtotal: f64,
    pub delivery_fee: f64,
    pub discount: f64,
    pub total: f64,
    pub delivery_address: DeliveryAddress,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_phone: String,
    pub idempotency_key: Option<String>,
    pub created_at: i64,
}

/// A priced line ready to insert
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub product_name: String,
    pub product_image: Option<String>,
    pub unit_price: f64,
    pub quantity: i64,
    pub total_price: f64,
}

/// One audit trail entry
#[derive(Debug, Clone, Copy)]
pub struct StatusChange<'a> {
    pub from: Option<OrderStatus>,
    pub to: OrderStatus,
    pub actor_id: Option<i64>,
    pub actor_role: Option<Role>,
    pub note: Option<&'a str>,
}

// ==================== Reads ====================

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let sql = format!("SELECT {COLUMNS} FROM orders WHERE id = ?");
    let row = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_idempotency_key(
    conn: &mut SqliteConnection,
    key: &str,
) -> RepoResult<Option<Order>> {
    let sql = format!("SELECT {COLUMNS} FROM orders WHERE idempotency_key = ?");
    let row = sqlx::query_as::<_, Order>(&sql)
        .bind(key)
        .fetch_optional(conn)
        .await?;
    Ok(row)
}

pub async fn find_items(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<OrderItem>> {
    let sql = format!("SELECT {ITEM_COLUMNS} FROM order_item WHERE order_id = ? ORDER BY created_at, id");
    let rows = sqlx::query_as::<_, OrderItem>(&sql)
        .bind(order_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_history(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<OrderStatusChange>> {
    let sql = format!(
        "SELECT {HISTORY_COLUMNS} FROM order_status_history WHERE order_id = ? ORDER BY id"
    );
    let rows = sqlx::query_as::<_, OrderStatusChange>(&sql)
        .bind(order_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Order with its lines and status history
pub async fn find_detail(pool: &SqlitePool, id: i64) -> RepoResult<Option<OrderDetail>> {
    let Some(order) = find_by_id(pool, id).await? else {
        return Ok(None);
    };
    let items = find_items(pool, id).await?;
    let history = find_history(pool, id).await?;
    Ok(Some(OrderDetail {
        order,
        items,
        history,
    }))
}

/// A customer's own orders, newest first
pub async fn find_by_user(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<Order>> {
    let sql = format!("SELECT {COLUMNS} FROM orders WHERE user_id = ? ORDER BY created_at DESC, id DESC");
    let rows = sqlx::query_as::<_, Order>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn count_by_user(pool: &SqlitePool, user_id: i64) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Back-office listing, newest first, optionally narrowed to one status
pub async fn find_all(
    pool: &SqlitePool,
    status: Option<OrderStatus>,
    limit: Option<i64>,
) -> RepoResult<Vec<Order>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM orders WHERE (?1 IS NULL OR status = ?1) \
         ORDER BY created_at DESC, id DESC LIMIT ?2"
    );
    let rows = sqlx::query_as::<_, Order>(&sql)
        .bind(status)
        .bind(limit.unwrap_or(-1))
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Confirmed or preparing orders that are unassigned or already assigned to `rider_id`,
/// oldest first so the queue is worked in order
pub async fn find_available_for_rider(pool: &SqlitePool, rider_id: i64) -> RepoResult<Vec<Order>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM orders WHERE status IN ('confirmed', 'preparing') \
         AND (rider_id IS NULL OR rider_id = ?) ORDER BY created_at, id"
    );
    let rows = sqlx::query_as::<_, Order>(&sql)
        .bind(rider_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// A rider's orders currently out for delivery
pub async fn find_delivering_by_rider(pool: &SqlitePool, rider_id: i64) -> RepoResult<Vec<Order>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM orders WHERE status = 'out_for_delivery' AND rider_id = ? \
         ORDER BY updated_at DESC, id DESC"
    );
    let rows = sqlx::query_as::<_, Order>(&sql)
        .bind(rider_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

// ==================== Writes (inside a transaction) ====================

pub async fn insert(conn: &mut SqliteConnection, data: &NewOrder) -> RepoResult<Order> {
    let sql = format!(
        "INSERT INTO orders (id, order_number, user_id, status, subtotal, delivery_fee, discount, total, \
         delivery_address, payment_method, payment_status, notes, customer_name, customer_email, \
         customer_phone, version, idempotency_key, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, 1, ?16, ?17, ?17) \
         RETURNING {COLUMNS}"
    );
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(snowflake_id())
        .bind(&data.order_number)
        .bind(data.user_id)
        .bind(OrderStatus::Pending)
        .bind(data.subtotal)
        .bind(data.delivery_fee)
        .bind(data.discount)
        .bind(data.total)
        .bind(Json(&data.delivery_address))
        .bind(data.payment_method)
        .bind(PaymentStatus::Pending)
        .bind(&data.notes)
        .bind(&data.customer_name)
        .bind(&data.customer_email)
        .bind(&data.customer_phone)
        .bind(&data.idempotency_key)
        .bind(data.created_at)
        .fetch_one(conn)
        .await?;
    Ok(order)
}

pub async fn insert_item(
    conn: &mut SqliteConnection,
    order_id: i64,
    item: &NewOrderItem,
    created_at: i64,
) -> RepoResult<OrderItem> {
    let sql = format!(
        "INSERT INTO order_item (id, order_id, product_id, product_name, product_image, unit_price, \
         quantity, total_price, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9) \
         RETURNING {ITEM_COLUMNS}"
    );
    let row = sqlx::query_as::<_, OrderItem>(&sql)
        .bind(snowflake_id())
        .bind(order_id)
        .bind(item.product_id)
        .bind(&item.product_name)
        .bind(&item.product_image)
        .bind(item.unit_price)
        .bind(item.quantity)
        .bind(item.total_price)
        .bind(created_at)
        .fetch_one(conn)
        .await?;
    Ok(row)
}

pub async fn insert_history(
    conn: &mut SqliteConnection,
    order_id: i64,
    change: StatusChange<'_>,
    created_at: i64,
) -> RepoResult<()> {
    // rowid keeps entries in write order within the same millisecond
    sqlx::query(
        "INSERT INTO order_status_history (order_id, from_status, to_status, actor_id, actor_role, note, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(order_id)
    .bind(change.from)
    .bind(change.to)
    .bind(change.actor_id)
    .bind(change.actor_role)
    .bind(change.note)
    .bind(created_at)
    .execute(conn)
    .await?;
    Ok(())
}

/// Write a decided transition if the row is still at `version`.
///
/// Returns `None` when another writer got there first.
pub async fn apply_transition(
    conn: &mut SqliteConnection,
    id: i64,
    version: i64,
    transition: &Transition,
    now: i64,
) -> RepoResult<Option<Order>> {
    let sql = format!(
        "UPDATE orders SET status = ?1, rider_id = ?2, payment_status = ?3, \
         delivered_at = CASE WHEN ?4 THEN ?5 ELSE delivered_at END, \
         version = version + 1, updated_at = ?5 \
         WHERE id = ?6 AND version = ?7 RETURNING {COLUMNS}"
    );
    let row = sqlx::query_as::<_, Order>(&sql)
        .bind(transition.to)
        .bind(transition.rider_id)
        .bind(transition.payment_status)
        .bind(transition.mark_delivered)
        .bind(now)
        .bind(id)
        .bind(version)
        .fetch_optional(conn)
        .await?;
    Ok(row)
}

/// Put every line's quantity back on its product (deleted products are skipped)
pub async fn restore_stock(conn: &mut SqliteConnection, order_id: i64, now: i64) -> RepoResult<u64> {
    let rows = sqlx::query(
        "UPDATE product SET stock_quantity = stock_quantity + \
         (SELECT SUM(quantity) FROM order_item WHERE order_item.order_id = ?1 AND order_item.product_id = product.id), \
         updated_at = ?2 \
         WHERE id IN (SELECT product_id FROM order_item WHERE order_id = ?1 AND product_id IS NOT NULL)",
    )
    .bind(order_id)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(rows.rows_affected())
}

/// Current version, for conflict reporting
pub async fn current_version(pool: &SqlitePool, id: i64) -> RepoResult<i64> {
    sqlx::query_scalar::<_, i64>("SELECT version FROM orders WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))
}
