//! API routes
//!
//! # Structure
//!
//! - [`health`] - liveness and database check
//! - [`auth`] - sign-up, login, logout, current user
//! - [`categories`] - storefront categories, admin CRUD
//! - [`products`] - catalog browse and search, admin CRUD
//! - [`banners`] - hero banners, admin CRUD and ordering
//! - [`cart`] - cart quote and checkout
//! - [`profile`] - own profile and saved addresses
//! - [`orders`] - own orders, admin order desk
//! - [`dashboard`] - admin figures
//! - [`customers`] - admin customer list
//! - [`riders`] - admin rider accounts, rider app
//!
//! Authentication runs once for the whole tree (see
//! [`crate::auth::require_auth`]); admin and rider sub-routers add their
//! role check as a layer.

pub mod convert;

pub mod auth;
pub mod health;

// Storefront
pub mod banners;
pub mod cart;
pub mod categories;
pub mod products;

// Accounts
pub mod profile;

// Orders
pub mod customers;
pub mod dashboard;
pub mod orders;
pub mod riders;

use axum::Router;

use crate::core::ServerState;

pub use crate::utils::{AppError, AppResult};

/// Every route the server exposes.
///
/// Takes the state for layers that need it up front (rate limits).
pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router(state))
        .merge(categories::router())
        .merge(products::router())
        .merge(banners::router())
        .merge(cart::router())
        .merge(profile::router())
        .merge(orders::router())
        .merge(dashboard::router())
        .merge(customers::router())
        .merge(riders::router())
}
