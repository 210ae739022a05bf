//! Shared types for the grocery store
//!
//! Domain models, the order lifecycle, money arithmetic, the cart and the
//! unified error type. No I/O lives here.

pub mod cart;
pub mod client;
pub mod error;
pub mod models;
pub mod order;
pub mod util;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use serde::{Deserialize, Serialize};
