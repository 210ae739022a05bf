//! Rider Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::convert::duplicate_as;
use crate::auth::{CurrentUser, hash_password};
use crate::core::ServerState;
use crate::db::repository::profile::{self, NewProfile};
use crate::db::repository::order;
use crate::orders;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_email, validate_optional_text, validate_password,
    validate_required_text,
};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};
use shared::models::{OrderDetail, Profile, RiderCreate, RiderOrders, RiderSummary, Role};
use shared::order::OrderAction;

/// GET /api/admin/riders - with active and delivered counts
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<RiderSummary>>> {
    Ok(Json(profile::list_riders(state.pool()).await?))
}

/// POST /api/admin/riders - create a rider account
pub async fn create(
    State(state): State<ServerState>,
    admin: CurrentUser,
    Json(payload): Json<RiderCreate>,
) -> AppResult<Json<Profile>> {
    validate_email(&payload.email)?;
    validate_password(&payload.password)?;
    validate_required_text(&payload.full_name, "full_name", MAX_NAME_LEN)?;
    validate_optional_text(payload.phone.as_deref(), "phone", MAX_SHORT_TEXT_LEN)?;

    let email = payload.email.trim().to_lowercase();
    let password_hash = hash_password(&payload.password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;

    let rider = profile::create(
        state.pool(),
        NewProfile {
            email: email.clone(),
            password_hash,
            full_name: Some(payload.full_name.trim().to_string()),
            phone: payload.phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()),
            role: Role::Rider,
        },
    )
    .await
    .map_err(duplicate_as(ErrorCode::EmailAlreadyRegistered, ("email", email.into())))?;

    tracing::info!(rider_id = rider.id, admin_id = admin.id, "Rider account created");
    Ok(Json(rider))
}

/// DELETE /api/admin/riders/{id} - demote to customer
///
/// The profile and its delivery history stay.
pub async fn remove(
    State(state): State<ServerState>,
    admin: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    let rider = profile::find_by_id(state.pool(), id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::RiderNotFound).with_detail("rider_id", id))?;
    if rider.role != Role::Rider {
        return Err(AppError::new(ErrorCode::NotARider).with_detail("profile_id", id));
    }
    profile::set_role(state.pool(), id, Role::Customer).await?;

    tracing::info!(rider_id = id, admin_id = admin.id, "Rider demoted to customer");
    Ok(Json(ApiResponse::ok()))
}

/// GET /api/rider/orders
pub async fn my_queue(
    State(state): State<ServerState>,
    rider: CurrentUser,
) -> AppResult<Json<RiderOrders>> {
    let available = order::find_available_for_rider(state.pool(), rider.id).await?;
    let mine = order::find_delivering_by_rider(state.pool(), rider.id).await?;
    Ok(Json(RiderOrders { available, mine }))
}

/// POST /api/rider/orders/{id}/pickup
pub async fn pick_up(
    State(state): State<ServerState>,
    rider: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderDetail>> {
    let detail = orders::apply(state.pool(), id, rider.actor(), OrderAction::PickUp, None, None).await?;
    Ok(Json(detail))
}

/// POST /api/rider/orders/{id}/deliver
pub async fn deliver(
    State(state): State<ServerState>,
    rider: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderDetail>> {
    let detail = orders::apply(state.pool(), id, rider.actor(), OrderAction::Deliver, None, None).await?;
    Ok(Json(detail))
}
