//! Product API module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/api/products", public_routes())
        .nest("/api/admin/products", admin_routes())
}

fn public_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list_active))
        .route("/search", get(handler::search))
        .route("/quick-search", get(handler::quick_search))
        .route("/{id}", get(handler::get_active))
        .route("/{id}/related", get(handler::related))
}

fn admin_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list_all).post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .route("/{id}/active", put(handler::set_active))
        .layer(middleware::from_fn(require_admin))
}
