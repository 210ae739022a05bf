use crate::auth::JwtConfig;
use crate::auth::jwt::{MIN_SECRET_LEN, generate_dev_secret};
use crate::core::ServerError;

/// Server configuration
///
/// # Environment variables
///
/// Every field can be overridden from the environment:
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | ENVIRONMENT | development | development, staging or production |
/// | HTTP_PORT | 3000 | HTTP listen port |
/// | DATABASE_PATH | grocery.db | SQLite file (`:memory:` allowed) |
/// | JWT_SECRET | random (development only) | token signing secret |
/// | JWT_EXPIRATION_MINUTES | 1440 | token lifetime |
/// | REQUEST_TIMEOUT_MS | 30000 | request timeout (ms) |
/// | DELIVERY_FEE | 10 | flat delivery fee |
/// | FREE_DELIVERY_THRESHOLD | 100 | subtotal that waives the fee |
/// | LOG_LEVEL | info | tracing filter when `RUST_LOG` is unset |
/// | LOG_DIR | unset | daily rolling log files when set |
/// | SEED_DEMO_USERS | false | ensure demo accounts at start |
///
/// # Example
///
/// ```ignore
/// DATABASE_PATH=/data/grocery.db HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// development | staging | production
    pub environment: String,
    pub http_port: u16,
    pub database_path: String,
    pub jwt: JwtConfig,
    pub request_timeout_ms: u64,
    pub delivery_fee: f64,
    pub free_delivery_threshold: f64,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub seed_demo_users: bool,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            http_port: env_or("HTTP_PORT", 3000),
            database_path: std::env::var("DATABASE_PATH").unwrap_or_else(|_| "grocery.db".into()),
            jwt: JwtConfig::from_env(),
            request_timeout_ms: env_or("REQUEST_TIMEOUT_MS", 30_000),
            delivery_fee: env_or("DELIVERY_FEE", 10.0),
            free_delivery_threshold: env_or("FREE_DELIVERY_THRESHOLD", 100.0),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            seed_demo_users: env_or("SEED_DEMO_USERS", false),
        }
    }

    /// Environment config with another database; used by tests
    pub fn with_overrides(database_path: impl Into<String>) -> Self {
        let mut config = Self::from_env();
        config.database_path = database_path.into();
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Check the JWT secret, generating one for non-production runs.
    ///
    /// Production refuses to start without a secret of at least 32 bytes.
    pub fn validate(&mut self) -> Result<(), ServerError> {
        if self.jwt.secret.is_empty() {
            if self.is_production() {
                return Err(ServerError::Config(
                    "JWT_SECRET must be set in production".into(),
                ));
            }
            tracing::warn!("JWT_SECRET not set, using a random secret; tokens will not survive a restart");
            self.jwt.secret = generate_dev_secret();
        }
        if self.is_production() && self.jwt.secret.len() < MIN_SECRET_LEN {
            return Err(ServerError::Config(format!(
                "JWT_SECRET must be at least {MIN_SECRET_LEN} bytes"
            )));
        }
        if self.delivery_fee < 0.0 || self.free_delivery_threshold < 0.0 {
            return Err(ServerError::Config(
                "DELIVERY_FEE and FREE_DELIVERY_THRESHOLD must not be negative".into(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(environment: &str, secret: &str) -> Config {
        let mut c = Config::with_overrides(":memory:");
        c.environment = environment.into();
        c.jwt.secret = secret.into();
        c.delivery_fee = 10.0;
        c.free_delivery_threshold = 100.0;
        c
    }

    #[test]
    fn development_gets_a_generated_secret() {
        let mut c = config("development", "");
        c.validate().unwrap();
        assert_eq!(c.jwt.secret.len(), 64);
    }

    #[test]
    fn production_requires_a_strong_secret() {
        assert!(config("production", "").validate().is_err());
        assert!(config("production", "short").validate().is_err());
        config("production", &"x".repeat(32)).validate().unwrap();
    }

    #[test]
    fn negative_fee_is_rejected() {
        let mut c = config("development", "secret");
        c.delivery_fee = -1.0;
        assert!(c.validate().is_err());
    }
}
