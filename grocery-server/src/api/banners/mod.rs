//! Banner API module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/banners", get(handler::list_active))
        .nest("/api/admin/banners", admin_routes())
}

fn admin_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list_all).post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .route("/{id}/active", put(handler::set_active))
        .route("/{id}/move", post(handler::move_banner))
        .layer(middleware::from_fn(require_admin))
}
