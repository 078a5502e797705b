//! Cache-side ports. Implementations are best-effort companions of the relational store.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use super::RepoResult;
use crate::entities::{ReactionDelta, ReferenceType};
use crate::value_objects::RateLimitScope;

/// Per-reference emoji count cache
#[async_trait]
pub trait ReactionCountCache: Send + Sync {
    /// Cached counts; empty when the key is cold
    async fn get_counts(
        &self,
        reference_type: ReferenceType,
        reference_id: Uuid,
    ) -> RepoResult<HashMap<String, i64>>;

    /// Apply a toggle transition, only if the key is already warm
    async fn apply_delta(
        &self,
        reference_type: ReferenceType,
        reference_id: Uuid,
        delta: &ReactionDelta,
    ) -> RepoResult<()>;

    /// Overwrite the cached counts with an authoritative aggregate
    async fn replace_counts(
        &self,
        reference_type: ReferenceType,
        reference_id: Uuid,
        counts: &HashMap<String, i64>,
    ) -> RepoResult<()>;
}

/// Ephemeral per-thread view accumulation
#[async_trait]
pub trait ViewCounterStore: Send + Sync {
    /// Count a view unless this user already viewed the thread within the dedup window.
    /// Returns whether the view was counted.
    async fn record_view(&self, thread_id: Uuid, user_id: Uuid) -> RepoResult<bool>;

    /// Threads with views not yet flushed
    async fn pending_threads(&self) -> RepoResult<Vec<Uuid>>;

    /// Remove the thread from the pending set and take its accumulated counter
    async fn take_pending(&self, thread_id: Uuid) -> RepoResult<i64>;

    /// Put a taken delta back after a failed flush
    async fn restore(&self, thread_id: Uuid, delta: i64) -> RepoResult<()>;
}

/// Per-user cooldown locks
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Take the lock for `window`. Returns false while a previous lock is still live.
    async fn try_acquire(
        &self,
        user_id: Uuid,
        scope: RateLimitScope,
        window: Duration,
    ) -> RepoResult<bool>;

    /// Remaining cooldown; zero when unlocked
    async fn remaining(&self, user_id: Uuid, scope: RateLimitScope) -> RepoResult<Duration>;

    async fn release(&self, user_id: Uuid, scope: RateLimitScope) -> RepoResult<()>;
}
