//! Authentication and authorization
//!
//! - [`JwtService`] - token issue/validation
//! - [`CurrentUser`] / [`MaybeUser`] - caller extractors
//! - [`require_auth`] / [`require_admin`] / [`require_rider`] - middleware
//! - [`RateLimiter`] - per-IP limits for login and sign-up

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod rate_limit;

pub use extractor::MaybeUser;
pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{require_admin, require_auth, require_rider};
pub use password::{MIN_PASSWORD_LEN, hash_password, verify_password};
pub use rate_limit::{RateLimiter, login_rate_limit, signup_rate_limit};
