//! Application state
//!
//! Holds the service context plus the raw pools the readiness probe pings.

use std::sync::Arc;

use engage_cache::RedisPool;
use engage_db::PgPool;
use engage_service::ServiceContext;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    service_context: Arc<ServiceContext>,
    pool: PgPool,
    redis_pool: RedisPool,
}

impl AppState {
    /// Create a new AppState
    pub fn new(service_context: ServiceContext, pool: PgPool, redis_pool: RedisPool) -> Self {
        Self {
            service_context: Arc::new(service_context),
            pool,
            redis_pool,
        }
    }

    /// Get the service context
    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    /// PostgreSQL pool, for health checks
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Redis pool, for health checks
    pub fn redis_pool(&self) -> &RedisPool {
        &self.redis_pool
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &self.service_context)
            .field("redis_pool", &self.redis_pool)
            .finish_non_exhaustive()
    }
}
