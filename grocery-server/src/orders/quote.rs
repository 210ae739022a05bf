//! Cart quote
//!
//! Read-only pricing of a client cart. Nothing is reserved; checkout
//! re-checks everything inside its transaction.

use std::collections::HashMap;

use rust_decimal::Decimal;
use shared::cart::{CartProduct, CartQuote, LineIssue, QuoteLine};
use shared::error::AppResult;
use shared::models::{CheckoutLine, Product};
use shared::order::money::{line_total, to_decimal, to_f64};
use shared::order::{DeliveryPolicy, Totals};
use sqlx::SqlitePool;

use super::merge_lines;
use crate::db::repository::product;

pub async fn quote(
    pool: &SqlitePool,
    policy: &DeliveryPolicy,
    lines: &[CheckoutLine],
) -> AppResult<CartQuote> {
    if lines.is_empty() {
        return Ok(CartQuote {
            lines: vec![],
            subtotal: 0.0,
            delivery_fee: 0.0,
            total: 0.0,
            orderable: false,
        });
    }
    let lines = merge_lines(lines)?;

    let ids: Vec<i64> = lines.iter().map(|l| l.product_id).collect();
    let products: HashMap<i64, Product> = product::find_by_ids(pool, &ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let priced: Vec<QuoteLine> = lines
        .iter()
        .map(|line| price_line(line, products.get(&line.product_id)))
        .collect();

    let orderable_totals: Vec<Decimal> = priced
        .iter()
        .filter(|l| l.issue.is_none())
        .map(|l| line_total(to_decimal(l.unit_price), l.quantity))
        .collect();

    let orderable = orderable_totals.len() == priced.len();
    let totals = if orderable_totals.is_empty() {
        Totals {
            subtotal: 0.0,
            delivery_fee: 0.0,
            discount: 0.0,
            total: 0.0,
        }
    } else {
        Totals::compute(orderable_totals, policy, Decimal::ZERO)
    };

    Ok(CartQuote {
        lines: priced,
        subtotal: totals.subtotal,
        delivery_fee: totals.delivery_fee,
        total: totals.total,
        orderable,
    })
}

fn price_line(line: &CheckoutLine, product: Option<&Product>) -> QuoteLine {
    let Some(p) = product else {
        return QuoteLine {
            product_id: line.product_id,
            product: None,
            quantity: line.quantity,
            unit_price: 0.0,
            line_total: 0.0,
            available: 0,
            issue: Some(LineIssue::Unavailable),
        };
    };

    let unit_price = p.effective_price();
    let issue = if !p.is_active {
        Some(LineIssue::Unavailable)
    } else if !p.has_stock(line.quantity) {
        Some(LineIssue::InsufficientStock)
    } else {
        None
    };

    QuoteLine {
        product_id: p.id,
        product: Some(CartProduct::from(p)),
        quantity: line.quantity,
        unit_price: to_f64(unit_price),
        line_total: to_f64(line_total(unit_price, line.quantity)),
        available: if p.is_active { p.stock_quantity.max(0) } else { 0 },
        issue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::product::fixtures;
    use crate::db::repository::testing;

    fn line(product_id: i64, quantity: i64) -> CheckoutLine {
        CheckoutLine {
            product_id,
            quantity,
        }
    }

    #[tokio::test]
    async fn quote_prices_from_catalog_and_flags_problems() {
        let pool = testing::pool().await;
        let mut milk = fixtures::product("Milk", 6.5, 10);
        milk.sale_price = Some(5.25);
        let milk = product::create(&pool, milk).await.unwrap();
        let bread = product::create(&pool, fixtures::product("Bread", 4.0, 1))
            .await
            .unwrap();
        let hidden = product::create(&pool, fixtures::product("Old stock", 1.0, 50))
            .await
            .unwrap();
        product::set_active(&pool, hidden.id, false).await.unwrap();

        let q = quote(
            &pool,
            &DeliveryPolicy::default(),
            &[line(milk.id, 2), line(bread.id, 3), line(hidden.id, 1), line(424242, 1)],
        )
        .await
        .unwrap();

        assert_eq!(q.lines.len(), 4);
        assert_eq!(q.lines[0].unit_price, 5.25);
        assert_eq!(q.lines[0].line_total, 10.5);
        assert_eq!(q.lines[0].issue, None);
        assert_eq!(q.lines[1].issue, Some(LineIssue::InsufficientStock));
        assert_eq!(q.lines[1].available, 1);
        assert_eq!(q.lines[2].issue, Some(LineIssue::Unavailable));
        assert_eq!(q.lines[3].issue, Some(LineIssue::Unavailable));
        assert!(q.lines[3].product.is_none());

        // only the milk line counts
        assert!(!q.orderable);
        assert_eq!(q.subtotal, 10.5);
        assert_eq!(q.delivery_fee, 10.0);
        assert_eq!(q.total, 20.5);
    }

    #[tokio::test]
    async fn big_cart_ships_free() {
        let pool = testing::pool().await;
        let oil = product::create(&pool, fixtures::product("Olive oil", 25.0, 10))
            .await
            .unwrap();

        let q = quote(&pool, &DeliveryPolicy::default(), &[line(oil.id, 4)])
            .await
            .unwrap();
        assert!(q.orderable);
        assert_eq!(q.subtotal, 100.0);
        assert_eq!(q.delivery_fee, 0.0);
        assert_eq!(q.total, 100.0);
    }

    #[tokio::test]
    async fn empty_cart_quotes_zero() {
        let pool = testing::pool().await;
        let q = quote(&pool, &DeliveryPolicy::default(), &[]).await.unwrap();
        assert!(q.lines.is_empty());
        assert!(!q.orderable);
        assert_eq!(q.total, 0.0);
    }
}
