//! Request/response types of the auth API
//!
//! Shared between grocery-server and its clients.

use serde::{Deserialize, Serialize};

use crate::models::{Profile, Role};

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Where a customer wants to land after signing in
    pub next: Option<String>,
}

/// Sign-up request (always creates a customer)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
}

/// Token plus the signed-in profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    /// Seconds until `token` expires
    pub expires_in: i64,
    pub user: Profile,
    /// Role home (`/admin`, `/rider`) or the customer's `next`
    pub redirect_to: String,
}

/// `GET /api/auth/me`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUserResponse {
    pub user: Profile,
    pub role: Role,
    pub redirect_to: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_request_next_is_optional() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"email":"a@b.c","password":"secret1"}"#).unwrap();
        assert!(req.next.is_none());
    }
}
