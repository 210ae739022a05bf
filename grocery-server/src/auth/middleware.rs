//! Authentication middleware
//!
//! Axum middleware for JWT authentication and role checks.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use http::Method;

use crate::auth::CurrentUser;
use crate::auth::extractor::user_from_parts;
use crate::core::ServerState;
use crate::db::repository::profile;
use crate::security_log;
use shared::error::{AppError, ErrorCode};

/// Routes reachable without a token
///
/// A valid token on these routes is still decoded so handlers can tell a
/// signed-in caller from a guest.
fn is_public_api_route(method: &Method, path: &str) -> bool {
    if method == Method::GET
        && (path == "/api/banners"
            || path == "/api/categories"
            || path.starts_with("/api/categories/")
            || path == "/api/products"
            || path.starts_with("/api/products/"))
    {
        return true;
    }
    method == Method::POST
        && matches!(
            path,
            "/api/auth/signup"
                | "/api/auth/login"
                | "/api/auth/logout"
                | "/api/cart/quote"
                | "/api/checkout"
        )
}

/// Public routes where a bad token is an error rather than "guest"
fn rejects_bad_token(path: &str) -> bool {
    path == "/api/checkout"
}

/// Require a signed-in user on every `/api/` route except the public ones.
///
/// On success the [`CurrentUser`] is inserted into the request extensions.
///
/// # Skipped
///
/// - `OPTIONS *` (CORS preflight)
/// - non-`/api/` paths (health, 404s)
/// - the public storefront routes
///
/// # Errors
///
/// | Case | Status |
/// |------|--------|
/// | no `Authorization` header | 401 NotAuthenticated |
/// | expired token | 401 TokenExpired |
/// | invalid token | 401 TokenInvalid |
/// | profile deleted | 401 TokenInvalid |
///
/// The inserted user carries the role stored on the profile, not the one
/// signed into the token.
pub async fn require_auth(
    State(state): State<ServerState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == Method::OPTIONS || !req.uri().path().starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    let (mut parts, body) = req.into_parts();
    let path = parts.uri.path().to_owned();
    let jwt = state.get_jwt_service();

    if is_public_api_route(&parts.method, &path) {
        let decoded = match user_from_parts(&parts, &jwt) {
            Ok(Some(user)) => with_stored_role(&state, user).await,
            Ok(None) => Ok(None),
            Err(e) => Err(e),
        };
        match decoded {
            Ok(Some(user)) => {
                parts.extensions.insert(user);
            }
            Ok(None) => {}
            Err(e) if rejects_bad_token(&path) => return Err(e),
            Err(_) => {}
        }
        return Ok(next.run(Request::from_parts(parts, body)).await);
    }

    match user_from_parts(&parts, &jwt)? {
        Some(user) => {
            let user = with_stored_role(&state, user)
                .await?
                .ok_or_else(|| AppError::invalid_token("Account no longer exists"))?;
            parts.extensions.insert(user);
            Ok(next.run(Request::from_parts(parts, body)).await)
        }
        None => {
            security_log!("WARN", "auth_missing", uri = path);
            Err(AppError::not_authenticated())
        }
    }
}

/// Replace the role carried by the token with the one stored now.
///
/// `Ok(None)` when the profile is gone. Role changes (a rider removed by an
/// admin, say) take effect on the next request instead of at token expiry.
async fn with_stored_role(state: &ServerState, mut user: CurrentUser) -> Result<Option<CurrentUser>, AppError> {
    let Some(stored) = profile::find_by_id(state.pool(), user.id).await? else {
        security_log!("WARN", "auth_unknown_account", user_id = user.id);
        return Ok(None);
    };
    if stored.role != user.role {
        security_log!(
            "INFO",
            "role_changed",
            user_id = user.id,
            token_role = user.role.as_str(),
            stored_role = stored.role.as_str()
        );
        user.role = stored.role;
    }
    Ok(Some(user))
}

fn current_user(req: &Request) -> Result<&CurrentUser, AppError> {
    req.extensions()
        .get::<CurrentUser>()
        .ok_or_else(AppError::not_authenticated)
}

/// Admin-only routes
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let user = current_user(&req)?;
    if !user.is_admin() {
        security_log!(
            "WARN",
            "admin_required",
            user_id = user.id,
            user_role = user.role.as_str(),
            uri = req.uri().path().to_owned()
        );
        return Err(AppError::new(ErrorCode::AdminRequired));
    }
    Ok(next.run(req).await)
}

/// Rider app routes
pub async fn require_rider(req: Request, next: Next) -> Result<Response, AppError> {
    let user = current_user(&req)?;
    if !user.is_rider() {
        security_log!(
            "WARN",
            "rider_required",
            user_id = user.id,
            user_role = user.role.as_str(),
            uri = req.uri().path().to_owned()
        );
        return Err(AppError::new(ErrorCode::RiderRequired));
    }
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storefront_routes_are_public() {
        assert!(is_public_api_route(&Method::GET, "/api/products/quick-search"));
        assert!(is_public_api_route(&Method::GET, "/api/categories/dairy/products"));
        assert!(is_public_api_route(&Method::POST, "/api/checkout"));
        assert!(is_public_api_route(&Method::POST, "/api/auth/login"));
    }

    #[test]
    fn account_and_admin_routes_are_not() {
        assert!(!is_public_api_route(&Method::GET, "/api/auth/me"));
        assert!(!is_public_api_route(&Method::GET, "/api/orders"));
        assert!(!is_public_api_route(&Method::GET, "/api/admin/products"));
        assert!(!is_public_api_route(&Method::POST, "/api/products"));
        assert!(!is_public_api_route(&Method::GET, "/api/productsx"));
    }
}
