use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use shared::error::AppResult;

/// Server state - shared references to every service
///
/// Cheap to clone: the pool and JWT service are reference counted.
///
/// | Field | Type | Description |
/// |-------|------|-------------|
/// | config | Config | Immutable configuration |
/// | pool | SqlitePool | Database pool |
/// | jwt_service | Arc<JwtService> | Bearer token validation |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
}

impl ServerState {
    pub fn new(config: Config, pool: SqlitePool) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        Self {
            config,
            pool,
            jwt_service,
        }
    }

    /// Open the database (running migrations) and build the state
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        let db = DbService::new(
            &config.database_url,
            config.db_max_connections,
            config.db_busy_timeout_ms,
        )
        .await?;
        Ok(Self::new(config.clone(), db.pool))
    }
}
