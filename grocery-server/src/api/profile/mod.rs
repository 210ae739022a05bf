//! Own profile and saved addresses (any signed-in user)

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/profile", get(handler::get_profile).put(handler::update_profile))
        .nest("/api/addresses", address_routes())
}

fn address_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list_addresses).post(handler::create_address))
        .route("/{id}", put(handler::update_address).delete(handler::delete_address))
        .route("/{id}/default", post(handler::set_default_address))
}
