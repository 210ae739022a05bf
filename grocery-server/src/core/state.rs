//! Shared server state
//!
//! Cloned into every handler through axum's `State`. All fields are cheap
//! to clone (pool handles and `Arc`s).

use std::sync::Arc;

use shared::order::DeliveryPolicy;
use sqlx::SqlitePool;

use crate::auth::{JwtService, RateLimiter};
use crate::core::{Config, Result};
use crate::db::{DbService, seed};

#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub db: DbService,
    pub jwt_service: Arc<JwtService>,
    pub rate_limiter: RateLimiter,
    /// Fee and free-delivery threshold from config
    pub delivery: DeliveryPolicy,
}

impl ServerState {
    pub fn new(config: Config, db: DbService, jwt_service: Arc<JwtService>) -> Self {
        let delivery = DeliveryPolicy::new(config.delivery_fee, config.free_delivery_threshold);
        Self {
            config,
            db,
            jwt_service,
            rate_limiter: RateLimiter::new(),
            delivery,
        }
    }

    /// Validate config, open the database and run migrations, seed demo
    /// accounts when asked to
    pub async fn initialize(config: &Config) -> Result<Self> {
        let mut config = config.clone();
        config.validate()?;

        let db = DbService::new(&config.database_path).await?;
        if config.seed_demo_users {
            seed::seed_demo_users(&db.pool).await?;
        }

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        Ok(Self::new(config, db, jwt_service))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db.pool
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
