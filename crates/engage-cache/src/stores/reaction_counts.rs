//! Reaction count cache: one hash per reference, emoji → count.

use std::collections::HashMap;

use async_trait::async_trait;
use redis::{AsyncCommands, Script};
use tracing::{debug, instrument};
use uuid::Uuid;

use engage_core::entities::{ReactionDelta, ReferenceType};
use engage_core::traits::{ReactionCountCache, RepoResult};

use crate::keys;
use crate::pool::{RedisPool, RedisPoolError};

/// Sliding TTL on count hashes (7 days)
pub const COUNTS_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Applies `field, increment` pairs only when the hash exists, drops fields that reach
/// zero, and refreshes the TTL. ARGV ends with the TTL in seconds.
const APPLY_DELTA_LUA: &str = r"
if redis.call('EXISTS', KEYS[1]) == 0 then
    return 0
end
for i = 1, #ARGV - 1, 2 do
    local count = redis.call('HINCRBY', KEYS[1], ARGV[i], ARGV[i + 1])
    if count <= 0 then
        redis.call('HDEL', KEYS[1], ARGV[i])
    end
end
redis.call('EXPIRE', KEYS[1], ARGV[#ARGV])
return 1
";

/// Redis-backed [`ReactionCountCache`]
#[derive(Clone)]
pub struct RedisReactionCountCache {
    pool: RedisPool,
    apply_delta: Script,
}

impl RedisReactionCountCache {
    pub fn new(pool: RedisPool) -> Self {
        Self {
            pool,
            apply_delta: Script::new(APPLY_DELTA_LUA),
        }
    }
}

#[async_trait]
impl ReactionCountCache for RedisReactionCountCache {
    #[instrument(skip(self))]
    async fn get_counts(
        &self,
        reference_type: ReferenceType,
        reference_id: Uuid,
    ) -> RepoResult<HashMap<String, i64>> {
        let mut conn = self.pool.get().await?;
        let counts: HashMap<String, i64> = conn
            .hgetall(keys::reaction_counts(reference_type, reference_id))
            .await
            .map_err(RedisPoolError::from)?;
        Ok(counts)
    }

    #[instrument(skip(self))]
    async fn apply_delta(
        &self,
        reference_type: ReferenceType,
        reference_id: Uuid,
        delta: &ReactionDelta,
    ) -> RepoResult<()> {
        let increments = delta.increments();
        if increments.is_empty() {
            return Ok(());
        }

        let mut invocation = self.apply_delta.key(keys::reaction_counts(reference_type, reference_id));
        for (emoji, by) in increments {
            invocation.arg(emoji).arg(by);
        }
        invocation.arg(COUNTS_TTL_SECS);

        let mut conn = self.pool.get().await?;
        let applied: i64 = invocation
            .invoke_async(&mut conn)
            .await
            .map_err(RedisPoolError::from)?;

        if applied == 0 {
            debug!("Count cache cold, delta skipped");
        }
        Ok(())
    }

    #[instrument(skip(self, counts), fields(emojis = counts.len()))]
    async fn replace_counts(
        &self,
        reference_type: ReferenceType,
        reference_id: Uuid,
        counts: &HashMap<String, i64>,
    ) -> RepoResult<()> {
        let key = keys::reaction_counts(reference_type, reference_id);
        let fields: Vec<(&str, i64)> = counts
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(emoji, count)| (emoji.as_str(), *count))
            .collect();

        let mut pipe = redis::pipe();
        pipe.atomic().del(&key).ignore();
        if !fields.is_empty() {
            pipe.hset_multiple(&key, fields.as_slice())
                .ignore()
                .expire(&key, COUNTS_TTL_SECS)
                .ignore();
        }

        let mut conn = self.pool.get().await?;
        pipe.query_async::<()>(&mut conn)
            .await
            .map_err(RedisPoolError::from)?;
        Ok(())
    }
}
