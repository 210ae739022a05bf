//! Riders
//!
//! - /api/admin/riders: rider accounts (admin)
//! - /api/rider/orders: the rider app's queue and actions (rider)

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use crate::auth::{require_admin, require_rider};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/api/admin/riders", admin_routes())
        .nest("/api/rider/orders", rider_routes())
}

fn admin_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", delete(handler::remove))
        .layer(middleware::from_fn(require_admin))
}

fn rider_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::my_queue))
        .route("/{id}/pickup", post(handler::pick_up))
        .route("/{id}/deliver", post(handler::deliver))
        .layer(middleware::from_fn(require_rider))
}
