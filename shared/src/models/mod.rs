//! Data models
//!
//! Shared between grocery-server and frontends (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (snowflake), timestamps are Unix milliseconds.

pub mod address;
pub mod banner;
pub mod category;
pub mod dashboard;
pub mod order;
pub mod product;
pub mod profile;

// Re-exports
pub use address::*;
pub use banner::*;
pub use category::*;
pub use dashboard::*;
pub use order::*;
pub use product::*;
pub use profile::*;
