//! Profile and Address Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::convert::not_found_as;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{address, order, profile};
use crate::utils::validation::{MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_address, validate_optional_text};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};
use shared::models::{Address, AddressInput, ProfileOverview, ProfileUpdate};

async fn overview(state: &ServerState, user_id: i64) -> AppResult<ProfileOverview> {
    let profile = profile::find_by_id(state.pool(), user_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound))?;
    let order_count = order::count_by_user(state.pool(), user_id).await?;
    Ok(ProfileOverview { profile, order_count })
}

/// GET /api/profile
pub async fn get_profile(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ProfileOverview>> {
    Ok(Json(overview(&state, user.id).await?))
}

/// PUT /api/profile - name and phone only
pub async fn update_profile(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ProfileUpdate>,
) -> AppResult<Json<ProfileOverview>> {
    validate_optional_text(payload.full_name.as_deref(), "full_name", MAX_NAME_LEN)?;
    validate_optional_text(payload.phone.as_deref(), "phone", MAX_SHORT_TEXT_LEN)?;

    profile::update(state.pool(), user.id, payload)
        .await
        .map_err(not_found_as(ErrorCode::ProfileNotFound, user.id))?;
    tracing::info!(user_id = user.id, "Profile updated");
    Ok(Json(overview(&state, user.id).await?))
}

/// GET /api/addresses - default first
pub async fn list_addresses(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Address>>> {
    Ok(Json(address::find_by_user(state.pool(), user.id).await?))
}

/// POST /api/addresses
///
/// The first address a user saves becomes the default.
pub async fn create_address(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<AddressInput>,
) -> AppResult<Json<Address>> {
    validate_address(&payload)?;
    let created = address::create(state.pool(), user.id, &payload).await?;
    tracing::info!(user_id = user.id, address_id = created.id, "Address saved");
    Ok(Json(created))
}

/// PUT /api/addresses/{id}
pub async fn update_address(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<AddressInput>,
) -> AppResult<Json<Address>> {
    validate_address(&payload)?;
    let updated = address::update(state.pool(), user.id, id, &payload)
        .await
        .map_err(not_found_as(ErrorCode::AddressNotFound, id))?;
    Ok(Json(updated))
}

/// DELETE /api/addresses/{id}
pub async fn delete_address(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    if !address::delete(state.pool(), user.id, id).await? {
        return Err(AppError::new(ErrorCode::AddressNotFound).with_detail("id", id));
    }
    Ok(Json(ApiResponse::ok()))
}

/// POST /api/addresses/{id}/default - returns the updated list
pub async fn set_default_address(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Address>>> {
    address::set_default(state.pool(), user.id, id)
        .await
        .map_err(not_found_as(ErrorCode::AddressNotFound, id))?;
    Ok(Json(address::find_by_user(state.pool(), user.id).await?))
}
