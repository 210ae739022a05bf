//! Order services
//!
//! - [`quote`]: re-price a cart against the live catalog
//! - [`checkout`]: turn a cart into an order in one transaction
//! - [`lifecycle`]: apply status changes and rider actions
//!
//! ```text
//! cart lines ─► quote (read only)
//!            └► checkout ─► take stock ─► order + items + history ─► commit
//! action ─► decide (pure) ─► versioned update ─► restore stock? ─► history ─► commit
//! ```

pub mod checkout;
pub mod lifecycle;
pub mod quote;

use std::collections::HashMap;

use shared::error::{AppError, ErrorCode};
use shared::models::{CheckoutLine, Order};

use crate::auth::CurrentUser;
use crate::utils::validation::{MAX_LINE_QUANTITY, MAX_ORDER_LINES};

pub use checkout::checkout;
pub use lifecycle::apply;
pub use quote::quote;

/// Merge repeated products and check quantities.
///
/// Keeps first-seen order. Fails on an empty cart or any quantity outside
/// `1..=999`, per line and after merging.
pub fn merge_lines(lines: &[CheckoutLine]) -> Result<Vec<CheckoutLine>, AppError> {
    if lines.is_empty() {
        return Err(AppError::new(ErrorCode::CartEmpty));
    }

    let mut merged: Vec<CheckoutLine> = Vec::with_capacity(lines.len());
    let mut index: HashMap<i64, usize> = HashMap::with_capacity(lines.len());
    for line in lines {
        if line.quantity <= 0 {
            return Err(AppError::new(ErrorCode::InvalidQuantity).with_detail("product_id", line.product_id));
        }
        if line.quantity > MAX_LINE_QUANTITY {
            return Err(too_many_units(line.product_id));
        }
        match index.get(&line.product_id) {
            Some(&i) => {
                merged[i].quantity = merged[i]
                    .quantity
                    .checked_add(line.quantity)
                    .filter(|q| *q <= MAX_LINE_QUANTITY)
                    .ok_or_else(|| too_many_units(line.product_id))?;
            }
            None => {
                index.insert(line.product_id, merged.len());
                merged.push(*line);
            }
        }
    }

    if merged.len() > MAX_ORDER_LINES {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("At most {MAX_ORDER_LINES} different products per order"),
        ));
    }
    Ok(merged)
}

fn too_many_units(product_id: i64) -> AppError {
    AppError::with_message(
        ErrorCode::InvalidQuantity,
        format!("At most {MAX_LINE_QUANTITY} units per product"),
    )
    .with_detail("product_id", product_id)
}

/// Owner, any admin, or the assigned rider
pub fn can_view(order: &Order, user: &CurrentUser) -> bool {
    user.is_admin()
        || order.user_id == Some(user.id)
        || (user.is_rider() && order.rider_id == Some(user.id))
}
