//! Checkout
//!
//! One SQL transaction: every line's stock is taken first (the first
//! statement is a write, so the transaction holds the write lock before it
//! reads anything), then the order, its items and the creation history row
//! are inserted. Any failure rolls the whole thing back.
//!
//! Prices always come from the product rows. The client sends product ids
//! and quantities only.

use rust_decimal::Decimal;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{CheckoutRequest, DeliveryAddress, OrderDetail};
use shared::order::money::{line_total, to_decimal, to_f64};
use shared::order::{DeliveryPolicy, OrderStatus, Totals};
use shared::util::{now_millis, order_number_at};
use sqlx::SqlitePool;

use super::merge_lines;
use crate::auth::CurrentUser;
use crate::db::repository::order::{self, NewOrder, NewOrderItem, StatusChange};
use crate::db::repository::{RepoError, address, product};
use crate::utils::validation::{
    MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_address, validate_contact, validate_optional_text,
};

/// Attempts at a unique order number when two checkouts share a millisecond
const ORDER_NUMBER_ATTEMPTS: i64 = 3;

/// Place an order for a guest (`user = None`) or a signed-in user
pub async fn checkout(
    pool: &SqlitePool,
    policy: &DeliveryPolicy,
    user: Option<&CurrentUser>,
    req: CheckoutRequest,
) -> AppResult<OrderDetail> {
    let lines = merge_lines(&req.items)?;
    validate_contact(&req.customer)?;
    validate_optional_text(req.notes.as_deref(), "notes", MAX_NOTE_LEN)?;

    let idempotency_key = req
        .idempotency_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string);
    validate_optional_text(idempotency_key.as_deref(), "idempotency_key", MAX_SHORT_TEXT_LEN)?;

    let delivery_address = resolve_address(pool, user, &req).await?;

    if let Some(key) = &idempotency_key {
        let mut conn = pool.acquire().await.map_err(RepoError::from)?;
        if let Some(existing) = order::find_by_idempotency_key(&mut conn, key).await? {
            drop(conn);
            return replay(pool, existing.id, existing.user_id, user).await;
        }
    }

    let now = now_millis();
    let mut tx = pool.begin().await.map_err(RepoError::from)?;

    // 1. Stock, in request order
    let mut items = Vec::with_capacity(lines.len());
    let mut line_totals: Vec<Decimal> = Vec::with_capacity(lines.len());
    for line in &lines {
        let Some(taken) = product::take_stock(&mut tx, line.product_id, line.quantity, now).await? else {
            tx.rollback().await.map_err(RepoError::from)?;
            return Err(stock_failure(pool, line.product_id, line.quantity).await);
        };
        let unit_price = to_decimal(taken.sale_price.unwrap_or(taken.price));
        let total = line_total(unit_price, line.quantity);
        line_totals.push(total);
        items.push(NewOrderItem {
            product_id: line.product_id,
            product_name: taken.name,
            product_image: taken.image_url,
            unit_price: to_f64(unit_price),
            quantity: line.quantity,
            total_price: to_f64(total),
        });
    }

    // 2. Totals, server side
    let totals = Totals::compute(line_totals, policy, Decimal::ZERO);

    let customer_email = req
        .customer
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_lowercase)
        .or_else(|| user.map(|u| u.email.clone()));

    let mut new_order = NewOrder {
        order_number: order_number_at(now),
        user_id: user.map(|u| u.id),
        subtotal: totals.subtotal,
        delivery_fee: totals.delivery_fee,
        discount: totals.discount,
        total: totals.total,
        delivery_address,
        payment_method: req.payment_method,
        notes: req.notes.as_deref().map(str::trim).filter(|n| !n.is_empty()).map(str::to_string),
        customer_name: req.customer.full_name.trim().to_string(),
        customer_email,
        customer_phone: req.customer.phone.trim().to_string(),
        idempotency_key: idempotency_key.clone(),
        created_at: now,
    };

    // 3. Order row
    let mut attempt = 0;
    let created = loop {
        match order::insert(&mut tx, &new_order).await {
            Ok(created) => break created,
            Err(RepoError::Duplicate(msg)) => {
                if let Some(key) = &idempotency_key
                    && let Some(existing) = order::find_by_idempotency_key(&mut tx, key).await?
                {
                    tx.rollback().await.map_err(RepoError::from)?;
                    return replay(pool, existing.id, existing.user_id, user).await;
                }
                attempt += 1;
                if attempt >= ORDER_NUMBER_ATTEMPTS {
                    return Err(RepoError::Duplicate(msg).into());
                }
                new_order.order_number = order_number_at(now + attempt);
            }
            Err(e) => return Err(e.into()),
        }
    };

    // 4. Items and history
    for item in &items {
        order::insert_item(&mut tx, created.id, item, now).await?;
    }
    order::insert_history(
        &mut tx,
        created.id,
        StatusChange {
            from: None,
            to: OrderStatus::Pending,
            actor_id: user.map(|u| u.id),
            actor_role: user.map(|u| u.role),
            note: None,
        },
        now,
    )
    .await?;

    // 5. Address book
    if let (Some(user), Some(input), true) = (user, &req.address, req.save_address) {
        address::insert(&mut tx, user.id, input).await?;
    }

    tx.commit().await.map_err(RepoError::from)?;

    tracing::info!(
        order_id = created.id,
        order_number = %created.order_number,
        user_id = ?created.user_id,
        total = created.total,
        lines = items.len(),
        "Order placed"
    );

    order::find_detail(pool, created.id)
        .await?
        .ok_or_else(|| AppError::order_not_found(created.id))
}

/// Saved address of the caller, or a new one from the payload
async fn resolve_address(
    pool: &SqlitePool,
    user: Option<&CurrentUser>,
    req: &CheckoutRequest,
) -> AppResult<DeliveryAddress> {
    match (req.address_id, &req.address) {
        (Some(_), Some(_)) => Err(AppError::validation(
            "Give either address_id or address, not both",
        )),
        (Some(id), None) => {
            let user = user.ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::DeliveryAddressRequired,
                    "Saved addresses need a signed-in user",
                )
            })?;
            let saved = address::find_for_user(pool, user.id, id)
                .await?
                .ok_or_else(|| AppError::new(ErrorCode::AddressNotFound).with_detail("address_id", id))?;
            Ok(DeliveryAddress::from(&saved))
        }
        (None, Some(input)) => {
            validate_address(input)?;
            Ok(DeliveryAddress::from(input))
        }
        (None, None) => Err(AppError::new(ErrorCode::DeliveryAddressRequired)),
    }
}

/// Return the order an idempotency key already produced, if the caller owns it
async fn replay(
    pool: &SqlitePool,
    order_id: i64,
    owner: Option<i64>,
    user: Option<&CurrentUser>,
) -> AppResult<OrderDetail> {
    if owner != user.map(|u| u.id) {
        return Err(AppError::with_message(
            ErrorCode::AlreadyExists,
            "Idempotency key already used",
        ));
    }
    tracing::info!(order_id, "Checkout replayed by idempotency key");
    order::find_detail(pool, order_id)
        .await?
        .ok_or_else(|| AppError::order_not_found(order_id))
}

/// Explain why `take_stock` found nothing to take
async fn stock_failure(pool: &SqlitePool, product_id: i64, requested: i64) -> AppError {
    match product::find_by_id(pool, product_id).await {
        Ok(Some(p)) if p.is_active => {
            tracing::info!(product_id, requested, available = p.stock_quantity, "Checkout short of stock");
            AppError::insufficient_stock(product_id, &p.name, p.stock_quantity)
                .with_detail("requested", requested)
        }
        Ok(_) => AppError::new(ErrorCode::ProductUnavailable).with_detail("product_id", product_id),
        Err(e) => e.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::product::fixtures;
    use crate::db::repository::{profile, testing};
    use shared::models::{AddressInput, CheckoutLine, CustomerContact, Role};
    use shared::order::{PaymentMethod, PaymentStatus};

    fn address_input() -> AddressInput {
        serde_json::from_str(r#"{"street":"Al Wasl Rd","area":"Jumeirah"}"#).unwrap()
    }

    fn request(items: Vec<CheckoutLine>) -> CheckoutRequest {
        CheckoutRequest {
            items,
            customer: CustomerContact {
                full_name: "Aisha Khan".into(),
                email: None,
                phone: "+971500000001".into(),
            },
            address_id: None,
            address: Some(address_input()),
            save_address: true,
            payment_method: PaymentMethod::Cod,
            notes: Some("  Leave at the door ".into()),
            idempotency_key: None,
        }
    }

    fn line(product_id: i64, quantity: i64) -> CheckoutLine {
        CheckoutLine {
            product_id,
            quantity,
        }
    }

    async fn customer(pool: &SqlitePool) -> CurrentUser {
        let p = profile::create(pool, profile::fixtures::new_profile("aisha@example.com", Role::Customer))
            .await
            .unwrap();
        CurrentUser {
            id: p.id,
            email: p.email,
            role: p.role,
        }
    }

    async fn stock_of(pool: &SqlitePool, id: i64) -> i64 {
        product::find_by_id(pool, id).await.unwrap().unwrap().stock_quantity
    }

    #[tokio::test]
    async fn guest_checkout_prices_and_takes_stock() {
        let pool = testing::pool().await;
        let mut dates = fixtures::product("Dates", 30.0, 10);
        dates.sale_price = Some(27.5);
        let dates = product::create(&pool, dates).await.unwrap();
        let water = product::create(&pool, fixtures::product("Water", 1.25, 48))
            .await
            .unwrap();

        let detail = checkout(
            &pool,
            &DeliveryPolicy::default(),
            None,
            request(vec![line(dates.id, 2), line(water.id, 6), line(dates.id, 1)]),
        )
        .await
        .unwrap();

        let order = &detail.order;
        assert!(order.order_number.starts_with("EG"));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.user_id, None);
        assert_eq!(order.version, 1);
        assert_eq!(order.notes.as_deref(), Some("Leave at the door"));
        assert_eq!(order.delivery_address.street, "Al Wasl Rd");

        // 3 × 27.50 + 6 × 1.25 = 90.00, below the free-delivery threshold
        assert_eq!(order.subtotal, 90.0);
        assert_eq!(order.delivery_fee, 10.0);
        assert_eq!(order.total, 100.0);
        let item_sum: f64 = detail.items.iter().map(|i| i.total_price).sum();
        assert_eq!(item_sum, order.subtotal);

        assert_eq!(detail.items.len(), 2);
        let dates_line = detail
            .items
            .iter()
            .find(|i| i.product_id == Some(dates.id))
            .unwrap();
        assert_eq!(dates_line.product_name, "Dates");
        assert_eq!(dates_line.unit_price, 27.5);
        assert_eq!(dates_line.quantity, 3);

        assert_eq!(detail.history.len(), 1);
        assert_eq!(detail.history[0].from_status, None);
        assert_eq!(detail.history[0].to_status, OrderStatus::Pending);

        assert_eq!(stock_of(&pool, dates.id).await, 7);
        assert_eq!(stock_of(&pool, water.id).await, 42);
    }

    #[tokio::test]
    async fn short_stock_leaves_nothing_behind() {
        let pool = testing::pool().await;
        let rice = product::create(&pool, fixtures::product("Rice", 20.0, 5))
            .await
            .unwrap();
        let salt = product::create(&pool, fixtures::product("Salt", 2.0, 1))
            .await
            .unwrap();

        let err = checkout(
            &pool,
            &DeliveryPolicy::default(),
            None,
            request(vec![line(rice.id, 2), line(salt.id, 3)]),
        )
        .await
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::InsufficientStock);
        let details = err.details.unwrap();
        assert_eq!(details["product_id"], salt.id);
        assert_eq!(details["available"], 1);

        // rice was taken before salt failed; the rollback puts it back
        assert_eq!(stock_of(&pool, rice.id).await, 5);
        let orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(orders, 0);
    }

    #[tokio::test]
    async fn inactive_product_is_unavailable() {
        let pool = testing::pool().await;
        let p = product::create(&pool, fixtures::product("Seasonal", 5.0, 5))
            .await
            .unwrap();
        product::set_active(&pool, p.id, false).await.unwrap();

        let err = checkout(&pool, &DeliveryPolicy::default(), None, request(vec![line(p.id, 1)]))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductUnavailable);
    }

    #[tokio::test]
    async fn signed_in_checkout_saves_address_and_replays_key() {
        let pool = testing::pool().await;
        let user = customer(&pool).await;
        let eggs = product::create(&pool, fixtures::product("Eggs", 12.0, 10))
            .await
            .unwrap();

        let mut req = request(vec![line(eggs.id, 1)]);
        req.idempotency_key = Some("cart-123".into());

        let first = checkout(&pool, &DeliveryPolicy::default(), Some(&user), req.clone())
            .await
            .unwrap();
        assert_eq!(first.order.user_id, Some(user.id));
        assert_eq!(first.order.customer_email.as_deref(), Some("aisha@example.com"));
        assert_eq!(first.history[0].actor_role, Some(Role::Customer));

        let saved = address::find_by_user(&pool, user.id).await.unwrap();
        assert_eq!(saved.len(), 1);
        assert!(saved[0].is_default);

        let again = checkout(&pool, &DeliveryPolicy::default(), Some(&user), req.clone())
            .await
            .unwrap();
        assert_eq!(again.order.id, first.order.id);
        assert_eq!(stock_of(&pool, eggs.id).await, 9);

        // a guest cannot replay someone else's key
        let err = checkout(&pool, &DeliveryPolicy::default(), None, req)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AlreadyExists);
    }

    #[tokio::test]
    async fn saved_address_must_belong_to_caller() {
        let pool = testing::pool().await;
        let user = customer(&pool).await;
        let tea = product::create(&pool, fixtures::product("Tea", 9.0, 10))
            .await
            .unwrap();
        let saved = address::create(&pool, user.id, &address_input()).await.unwrap();

        let mut req = request(vec![line(tea.id, 1)]);
        req.address = None;
        req.address_id = Some(saved.id);

        // guest
        let err = checkout(&pool, &DeliveryPolicy::default(), None, req.clone())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DeliveryAddressRequired);

        // owner
        let detail = checkout(&pool, &DeliveryPolicy::default(), Some(&user), req)
            .await
            .unwrap();
        assert_eq!(detail.order.delivery_address.area, "Jumeirah");
    }

    #[tokio::test]
    async fn address_is_required() {
        let pool = testing::pool().await;
        let mut req = request(vec![line(1, 1)]);
        req.address = None;
        let err = checkout(&pool, &DeliveryPolicy::default(), None, req)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DeliveryAddressRequired);
    }
}
