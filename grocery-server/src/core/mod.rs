//! Core: configuration, state, server and start-up errors
//!
//! - [`Config`] - environment configuration
//! - [`ServerState`] - state shared by all handlers
//! - [`Server`] - HTTP server
//! - [`ServerError`] - start-up errors

pub mod config;
pub mod error;
pub mod server;
pub mod state;

pub use config::Config;
pub use error::{Result, ServerError};
pub use server::{Server, build_app};
pub use state::ServerState;
