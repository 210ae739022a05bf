//! Authentication Handlers
//!
//! Sign-up, login, logout and the current-user lookup

use std::time::Duration;

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::api::convert::duplicate_as;
use crate::auth::{CurrentUser, MaybeUser, hash_password, verify_password};
use crate::core::ServerState;
use crate::db::repository::profile::{self, NewProfile};
use crate::security_log;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_email, validate_optional_text, validate_password,
};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};
use shared::client::{AuthResponse, CurrentUserResponse, LoginRequest, SignupRequest};
use shared::models::{Profile, Role};

/// Fixed delay before answering a login, found or not
const AUTH_FIXED_DELAY_MS: u64 = 200;

fn issue(state: &ServerState, user: Profile, redirect_to: String) -> AppResult<AuthResponse> {
    let token = state
        .get_jwt_service()
        .generate_token(&user)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;
    Ok(AuthResponse {
        token,
        expires_in: state.config.jwt.expiration_minutes * 60,
        user,
        redirect_to,
    })
}

/// POST /api/auth/signup - create a customer account and sign it in
pub async fn signup(
    State(state): State<ServerState>,
    Json(req): Json<SignupRequest>,
) -> AppResult<Json<AuthResponse>> {
    validate_email(&req.email)?;
    validate_password(&req.password)?;
    validate_optional_text(req.full_name.as_deref(), "full_name", MAX_NAME_LEN)?;
    validate_optional_text(req.phone.as_deref(), "phone", MAX_SHORT_TEXT_LEN)?;

    let email = req.email.trim().to_lowercase();
    let password_hash = hash_password(&req.password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;

    let user = profile::create(
        state.pool(),
        NewProfile {
            email: email.clone(),
            password_hash,
            full_name: req.full_name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            phone: req.phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()),
            role: Role::Customer,
        },
    )
    .await
    .map_err(duplicate_as(ErrorCode::EmailAlreadyRegistered, ("email", email.into())))?;

    tracing::info!(user_id = user.id, "Customer signed up");
    let redirect_to = user.role.home_path(None);
    Ok(Json(issue(&state, user, redirect_to)?))
}

/// POST /api/auth/login
///
/// One error for unknown email and wrong password.
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let email = req.email.trim().to_lowercase();
    let found = profile::find_by_email(state.pool(), &email).await?;

    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let user = match found {
        Some(p) if verify_password(&req.password, &p.password_hash) => p,
        Some(p) => {
            security_log!("WARN", "login_failed", user_id = p.id, reason = "invalid_password");
            return Err(AppError::invalid_credentials());
        }
        None => {
            security_log!("WARN", "login_failed", reason = "unknown_email");
            return Err(AppError::invalid_credentials());
        }
    };

    tracing::info!(user_id = user.id, role = %user.role, "User logged in");
    let redirect_to = user.role.home_path(req.next.as_deref());
    Ok(Json(issue(&state, user, redirect_to)?))
}

#[derive(Debug, Deserialize)]
pub struct MeQuery {
    pub next: Option<String>,
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<MeQuery>,
) -> AppResult<Json<CurrentUserResponse>> {
    let profile = profile::find_by_id(state.pool(), user.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound))?;
    let role = profile.role;
    Ok(Json(CurrentUserResponse {
        redirect_to: role.home_path(query.next.as_deref()),
        user: profile,
        role,
    }))
}

/// POST /api/auth/logout
///
/// Tokens are stateless; the client drops its copy.
pub async fn logout(MaybeUser(user): MaybeUser) -> Json<ApiResponse<()>> {
    if let Some(user) = user {
        tracing::info!(user_id = user.id, "User logged out");
    }
    Json(ApiResponse::ok())
}
