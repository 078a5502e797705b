//! Cooldown locks: presence of the key means the user is cooling down.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::{instrument, warn};
use uuid::Uuid;

use engage_core::traits::{RateLimitStore, RepoResult};
use engage_core::value_objects::RateLimitScope;

use crate::keys;
use crate::pool::{RedisPool, RedisPoolError};

/// Redis-backed [`RateLimitStore`]
#[derive(Clone)]
pub struct RedisRateLimitStore {
    pool: RedisPool,
}

impl RedisRateLimitStore {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RateLimitStore for RedisRateLimitStore {
    #[instrument(skip(self))]
    async fn try_acquire(
        &self,
        user_id: Uuid,
        scope: RateLimitScope,
        window: Duration,
    ) -> RepoResult<bool> {
        let window_ms = window.as_millis();
        if window_ms == 0 {
            return Ok(true);
        }

        let mut conn = self.pool.get().await?;
        let set: Option<String> = redis::cmd("SET")
            .arg(keys::rate_limit(user_id, scope))
            .arg("locked")
            .arg("NX")
            .arg("PX")
            .arg(u64::try_from(window_ms).unwrap_or(u64::MAX))
            .query_async(&mut conn)
            .await
            .map_err(RedisPoolError::from)?;

        Ok(set.is_some())
    }

    #[instrument(skip(self))]
    async fn remaining(&self, user_id: Uuid, scope: RateLimitScope) -> RepoResult<Duration> {
        let key = keys::rate_limit(user_id, scope);
        let mut conn = self.pool.get().await?;
        let pttl: i64 = conn.pttl(&key).await.map_err(RedisPoolError::from)?;

        match pttl {
            // -2: no key
            -2 => Ok(Duration::ZERO),
            // -1: key without expiry would lock the user out forever
            -1 => {
                warn!(key = %key, "Rate limit key had no TTL, deleting");
                conn.del::<_, ()>(&key).await.map_err(RedisPoolError::from)?;
                Ok(Duration::ZERO)
            }
            ms => Ok(Duration::from_millis(u64::try_from(ms).unwrap_or(0))),
        }
    }

    #[instrument(skip(self))]
    async fn release(&self, user_id: Uuid, scope: RateLimitScope) -> RepoResult<()> {
        let mut conn = self.pool.get().await?;
        conn.del::<_, ()>(keys::rate_limit(user_id, scope))
            .await
            .map_err(RedisPoolError::from)?;
        Ok(())
    }
}
