//! Easy Grocery server
//!
//! HTTP API for the storefront, the admin back-office and the rider app,
//! backed by SQLite.
//!
//! # Module layout
//!
//! ```text
//! grocery-server/src/
//! ├── core/      # config, state, server
//! ├── auth/      # JWT, password hashing, middleware, rate limiting
//! ├── db/        # pool, migrations, repositories, demo seeding
//! ├── orders/    # cart quote, checkout, order lifecycle
//! ├── api/       # routes and handlers
//! └── utils/     # logging, validation, time
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod orders;
pub mod utils;

pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState, build_app};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use utils::logger::{init_logger, init_logger_with_file};

/// Security event on the `security` target
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// Load `.env`, read the configuration and install the logger
pub fn setup_environment() -> Config {
    let dotenv_loaded = dotenv::dotenv().is_ok();
    let config = Config::from_env();
    init_logger_with_file(&config.log_level, config.is_production(), config.log_dir.as_deref());
    if dotenv_loaded {
        tracing::debug!("Loaded .env");
    }
    config
}

pub fn print_banner() {
    println!(
        r#"
  ___                  ___
 | __|__ _ ____  _    / __|_ _ ___  __ ___ _ _ _  _
 | _|/ _` (_-< || |  | (_ | '_/ _ \/ _/ -_) '_| || |
 |___\__,_/__/\_, |   \___|_| \___/\__\___|_|  \_, |
              |__/                             |__/
    "#
    );
}
