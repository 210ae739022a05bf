//! Admin customer list

use axum::{
    Json, Router,
    extract::{Query, State},
    middleware,
    routing::get,
};
use serde::Deserialize;

use crate::auth::require_admin;
use crate::core::ServerState;
use crate::db::repository::profile;
use crate::utils::AppResult;
use shared::models::CustomerSummary;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/admin/customers", get(list))
        .layer(middleware::from_fn(require_admin))
}

#[derive(Debug, Deserialize)]
pub struct CustomerQuery {
    /// Matches name, email or phone
    pub q: Option<String>,
}

/// GET /api/admin/customers?q=
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<CustomerQuery>,
) -> AppResult<Json<Vec<CustomerSummary>>> {
    Ok(Json(profile::list_customers(state.pool(), query.q.as_deref()).await?))
}
