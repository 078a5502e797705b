//! Per-thread view accumulation between flushes

use async_trait::async_trait;
use tracing::{instrument, warn};
use uuid::Uuid;

use engage_core::traits::{RepoResult, ViewCounterStore};

use crate::keys::{self, PENDING_VIEWS_KEY};
use crate::pool::{RedisPool, RedisPoolError};

/// A user's repeat views of a thread within this window count once
pub const VIEW_DEDUP_TTL_SECS: u64 = 60 * 60;

/// Redis-backed [`ViewCounterStore`]
#[derive(Clone)]
pub struct RedisViewCounter {
    pool: RedisPool,
}

impl RedisViewCounter {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ViewCounterStore for RedisViewCounter {
    #[instrument(skip(self))]
    async fn record_view(&self, thread_id: Uuid, user_id: Uuid) -> RepoResult<bool> {
        let mut conn = self.pool.get().await?;

        let marker: Option<String> = redis::cmd("SET")
            .arg(keys::thread_user_view(thread_id, user_id))
            .arg(1)
            .arg("NX")
            .arg("EX")
            .arg(VIEW_DEDUP_TTL_SECS)
            .query_async(&mut conn)
            .await
            .map_err(RedisPoolError::from)?;

        if marker.is_none() {
            return Ok(false);
        }

        redis::pipe()
            .atomic()
            .incr(keys::thread_views(thread_id), 1)
            .ignore()
            .sadd(PENDING_VIEWS_KEY, thread_id.to_string())
            .ignore()
            .query_async::<()>(&mut conn)
            .await
            .map_err(RedisPoolError::from)?;

        Ok(true)
    }

    #[instrument(skip(self))]
    async fn pending_threads(&self) -> RepoResult<Vec<Uuid>> {
        let mut conn = self.pool.get().await?;
        let members: Vec<String> = redis::cmd("SMEMBERS")
            .arg(PENDING_VIEWS_KEY)
            .query_async(&mut conn)
            .await
            .map_err(RedisPoolError::from)?;

        let mut pending = Vec::with_capacity(members.len());
        let mut malformed = Vec::new();
        for member in members {
            match member.parse::<Uuid>() {
                Ok(id) => pending.push(id),
                Err(_) => malformed.push(member),
            }
        }

        if !malformed.is_empty() {
            warn!(members = ?malformed, "Dropping malformed pending view entries");
            redis::cmd("SREM")
                .arg(PENDING_VIEWS_KEY)
                .arg(&malformed)
                .query_async::<()>(&mut conn)
                .await
                .map_err(RedisPoolError::from)?;
        }

        Ok(pending)
    }

    #[instrument(skip(self))]
    async fn take_pending(&self, thread_id: Uuid) -> RepoResult<i64> {
        let mut conn = self.pool.get().await?;
        let (delta,): (Option<i64>,) = redis::pipe()
            .atomic()
            .srem(PENDING_VIEWS_KEY, thread_id.to_string())
            .ignore()
            .cmd("GETDEL")
            .arg(keys::thread_views(thread_id))
            .query_async(&mut conn)
            .await
            .map_err(RedisPoolError::from)?;

        Ok(delta.unwrap_or(0))
    }

    #[instrument(skip(self))]
    async fn restore(&self, thread_id: Uuid, delta: i64) -> RepoResult<()> {
        if delta == 0 {
            return Ok(());
        }

        let mut conn = self.pool.get().await?;
        redis::pipe()
            .atomic()
            .incr(keys::thread_views(thread_id), delta)
            .ignore()
            .sadd(PENDING_VIEWS_KEY, thread_id.to_string())
            .ignore()
            .query_async::<()>(&mut conn)
            .await
            .map_err(RedisPoolError::from)?;
        Ok(())
    }
}
