//! Authentication Routes

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::{login_rate_limit, signup_rate_limit};
use crate::core::ServerState;

/// - /api/auth/signup, /api/auth/login: public, rate limited per IP
/// - /api/auth/logout: public
/// - /api/auth/me: signed in (global auth middleware)
pub fn router(state: &ServerState) -> Router<ServerState> {
    let login = Router::new()
        .route("/api/auth/login", post(handler::login))
        .layer(middleware::from_fn_with_state(state.clone(), login_rate_limit));

    let signup = Router::new()
        .route("/api/auth/signup", post(handler::signup))
        .layer(middleware::from_fn_with_state(state.clone(), signup_rate_limit));

    Router::new()
        .merge(login)
        .merge(signup)
        .route("/api/auth/me", get(handler::me))
        .route("/api/auth/logout", post(handler::logout))
}
