//! Banner API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::api::convert::not_found_as;
use crate::core::ServerState;
use crate::db::repository::banner;
use crate::utils::validation::{validate_banner_create, validate_banner_update};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};
use shared::models::{Banner, BannerCreate, BannerUpdate, MoveDirection};

#[derive(Debug, Deserialize)]
pub struct ActiveToggle {
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub direction: MoveDirection,
}

/// GET /api/banners - active banners by display order
pub async fn list_active(State(state): State<ServerState>) -> AppResult<Json<Vec<Banner>>> {
    Ok(Json(banner::find_active(state.pool()).await?))
}

/// GET /api/admin/banners
pub async fn list_all(State(state): State<ServerState>) -> AppResult<Json<Vec<Banner>>> {
    Ok(Json(banner::find_all(state.pool()).await?))
}

/// POST /api/admin/banners - appended after the last banner
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<BannerCreate>,
) -> AppResult<Json<Banner>> {
    validate_banner_create(&payload)?;
    let created = banner::create(state.pool(), payload).await?;
    tracing::info!(banner_id = created.id, position = created.display_order, "Banner created");
    Ok(Json(created))
}

/// PUT /api/admin/banners/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<BannerUpdate>,
) -> AppResult<Json<Banner>> {
    validate_banner_update(&payload)?;
    let updated = banner::update(state.pool(), id, payload)
        .await
        .map_err(not_found_as(ErrorCode::BannerNotFound, id))?;
    tracing::info!(banner_id = id, "Banner updated");
    Ok(Json(updated))
}

/// PUT /api/admin/banners/{id}/active
pub async fn set_active(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ActiveToggle>,
) -> AppResult<Json<Banner>> {
    let updated = banner::set_active(state.pool(), id, payload.is_active)
        .await
        .map_err(not_found_as(ErrorCode::BannerNotFound, id))?;
    Ok(Json(updated))
}

/// POST /api/admin/banners/{id}/move - swap with the neighbour
///
/// Returns every banner in the new order.
pub async fn move_banner(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<MoveRequest>,
) -> AppResult<Json<Vec<Banner>>> {
    let banners = banner::move_banner(state.pool(), id, payload.direction)
        .await
        .map_err(not_found_as(ErrorCode::BannerNotFound, id))?;
    tracing::info!(banner_id = id, direction = ?payload.direction, "Banner moved");
    Ok(Json(banners))
}

/// DELETE /api/admin/banners/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    if !banner::delete(state.pool(), id).await? {
        return Err(AppError::new(ErrorCode::BannerNotFound).with_detail("id", id));
    }
    tracing::info!(banner_id = id, "Banner deleted");
    Ok(Json(ApiResponse::ok()))
}
