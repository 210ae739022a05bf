//! Order API module
//!
//! - /api/orders: the caller's own orders
//! - /api/admin/orders: every order, status changes and rider assignment

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/api/orders", customer_routes())
        .nest("/api/admin/orders", admin_routes())
}

fn customer_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list_mine))
        .route("/{id}", get(handler::get_visible))
}

fn admin_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list_all))
        .route("/{id}", get(handler::get_any))
        .route("/{id}/status", put(handler::update_status))
        .route("/{id}/rider", put(handler::assign_rider))
        .layer(middleware::from_fn(require_admin))
}
