//! Cart Handlers

use axum::{Json, extract::State};

use crate::auth::MaybeUser;
use crate::core::ServerState;
use crate::orders;
use crate::utils::AppResult;
use shared::cart::{CartQuote, QuoteRequest};
use shared::models::{CheckoutRequest, OrderDetail};

/// POST /api/cart/quote - price a cart against the live catalog
pub async fn quote(
    State(state): State<ServerState>,
    Json(req): Json<QuoteRequest>,
) -> AppResult<Json<CartQuote>> {
    Ok(Json(orders::quote(state.pool(), &state.delivery, &req.items).await?))
}

/// POST /api/checkout - place an order
pub async fn checkout(
    State(state): State<ServerState>,
    MaybeUser(user): MaybeUser,
    Json(req): Json<CheckoutRequest>,
) -> AppResult<Json<OrderDetail>> {
    let detail = orders::checkout(state.pool(), &state.delivery, user.as_ref(), req).await?;
    Ok(Json(detail))
}
