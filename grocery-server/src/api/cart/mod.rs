//! Cart quote and checkout
//!
//! Both are public: guests quote and check out without a token, a signed-in
//! caller's order is linked to their profile.

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/cart/quote", post(handler::quote))
        .route("/api/checkout", post(handler::checkout))
}
