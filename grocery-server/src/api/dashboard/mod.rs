//! Admin dashboard

use axum::{Json, Router, extract::State, middleware, routing::get};

use crate::auth::require_admin;
use crate::core::ServerState;
use crate::db::repository::dashboard;
use crate::utils::AppResult;
use crate::utils::time::today_start_millis;
use shared::models::DashboardStats;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/admin/dashboard", get(stats))
        .layer(middleware::from_fn(require_admin))
}

/// GET /api/admin/dashboard - "today" is the server's local day
pub async fn stats(State(state): State<ServerState>) -> AppResult<Json<DashboardStats>> {
    Ok(Json(dashboard::stats(state.pool(), today_start_millis()).await?))
}
