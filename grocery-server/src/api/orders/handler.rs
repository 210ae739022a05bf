//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::order;
use crate::orders::{self, can_view};
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text};
use crate::utils::{AppError, AppResult};
use shared::models::{Order, OrderDetail, OrderStatusUpdate, RiderAssignment};
use shared::order::{OrderAction, OrderStatus};

/// Back-office listing query
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// One status, or `all` / absent for every order
    pub status: Option<String>,
    pub limit: Option<i64>,
}

impl ListQuery {
    fn status(&self) -> AppResult<Option<OrderStatus>> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") | Some("all") => Ok(None),
            Some(s) => s
                .parse::<OrderStatus>()
                .map(Some)
                .map_err(|e| AppError::validation(e).with_detail("field", "status")),
        }
    }
}

async fn load_detail(state: &ServerState, id: i64) -> AppResult<OrderDetail> {
    order::find_detail(state.pool(), id)
        .await?
        .ok_or_else(|| AppError::order_not_found(id))
}

/// GET /api/orders - own orders, newest first
pub async fn list_mine(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(order::find_by_user(state.pool(), user.id).await?))
}

/// GET /api/orders/{id}
///
/// Someone else's order reads as not found.
pub async fn get_visible(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderDetail>> {
    let detail = load_detail(&state, id).await?;
    if !can_view(&detail.order, &user) {
        return Err(AppError::order_not_found(id));
    }
    Ok(Json(detail))
}

/// GET /api/admin/orders?status=
pub async fn list_all(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let status = query.status()?;
    let limit = query.limit.filter(|l| *l > 0);
    Ok(Json(order::find_all(state.pool(), status, limit).await?))
}

/// GET /api/admin/orders/{id}
pub async fn get_any(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderDetail>> {
    Ok(Json(load_detail(&state, id).await?))
}

/// PUT /api/admin/orders/{id}/status
pub async fn update_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<OrderStatusUpdate>,
) -> AppResult<Json<OrderDetail>> {
    validate_optional_text(payload.note.as_deref(), "note", MAX_NOTE_LEN)?;
    let detail = orders::apply(
        state.pool(),
        id,
        user.actor(),
        OrderAction::UpdateStatus(payload.status),
        payload.expected_version,
        payload.note.as_deref(),
    )
    .await?;
    Ok(Json(detail))
}

/// PUT /api/admin/orders/{id}/rider - assign, reassign or clear (`null`)
pub async fn assign_rider(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<RiderAssignment>,
) -> AppResult<Json<OrderDetail>> {
    let detail = orders::apply(
        state.pool(),
        id,
        user.actor(),
        OrderAction::AssignRider(payload.rider_id),
        payload.expected_version,
        None,
    )
    .await?;
    Ok(Json(detail))
}
