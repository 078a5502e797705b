//! Repository traits (ports) - define the interface for persistent data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::entities::{
    ActionType, NewPointLog, NewPost, NewThread, Notification, Post, ReactionDelta,
    RecordOutcome, ReferenceType, ScoreRow, Thread, ThreadSummary, User, UserStats,
};
use crate::error::DomainError;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<User>>;

    /// Find user by username
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;
}

// ============================================================================
// Content Repositories
// ============================================================================

#[async_trait]
pub trait ThreadRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Thread>>;

    async fn create(&self, thread: &NewThread) -> RepoResult<Thread>;

    /// Add `delta` onto the stored view count server-side.
    /// Returns `ThreadNotFound` when the thread no longer exists.
    async fn add_views(&self, id: Uuid, delta: i64) -> RepoResult<()>;

    /// Threads created in the trending window ending at `now`, best score first
    async fn trending(&self, now: DateTime<Utc>, limit: i64) -> RepoResult<Vec<ThreadSummary>>;
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Post>>;

    async fn create(&self, post: &NewPost) -> RepoResult<Post>;
}

// ============================================================================
// Reaction Repository
// ============================================================================

#[async_trait]
pub trait ReactionRepository: Send + Sync {
    /// Insert, remove, or switch the user's reaction atomically and report the transition
    async fn toggle(
        &self,
        user_id: Uuid,
        reference_id: Uuid,
        reference_type: ReferenceType,
        emoji: &str,
    ) -> RepoResult<ReactionDelta>;

    /// The user's active emoji on a reference
    async fn find_user_emoji(
        &self,
        user_id: Uuid,
        reference_id: Uuid,
        reference_type: ReferenceType,
    ) -> RepoResult<Option<String>>;

    /// Authoritative per-emoji counts for a reference
    async fn count_by_emoji(
        &self,
        reference_id: Uuid,
        reference_type: ReferenceType,
    ) -> RepoResult<HashMap<String, i64>>;
}

// ============================================================================
// Leaderboard Repository
// ============================================================================

#[async_trait]
pub trait LeaderboardRepository: Send + Sync {
    /// Insert the point log and add its points onto the user's all-time total.
    /// Changes nothing when the log duplicates an actor credit or its daily cap is used up;
    /// the cap check and the insert are atomic per user.
    async fn record_award(&self, log: &NewPointLog) -> RepoResult<RecordOutcome>;

    /// Whether `actor_id` already produced this action on this reference
    async fn has_point_from_actor(
        &self,
        actor_id: Uuid,
        action: ActionType,
        reference_id: &str,
    ) -> RepoResult<bool>;

    /// Point logs of `action` for the user created at or after `since`
    async fn count_actions_since(
        &self,
        user_id: Uuid,
        action: ActionType,
        since: DateTime<Utc>,
    ) -> RepoResult<i64>;

    async fn find_user_stats(&self, user_id: Uuid) -> RepoResult<Option<UserStats>>;

    /// Users ordered by all-time total
    async fn top_by_all_time(&self, limit: i64) -> RepoResult<Vec<ScoreRow>>;

    /// Users ordered by points earned since `since`
    async fn top_by_period(&self, since: DateTime<Utc>, limit: i64) -> RepoResult<Vec<ScoreRow>>;

    /// All-time totals for the given users; users without stats are absent
    async fn all_time_points(&self, user_ids: &[Uuid]) -> RepoResult<HashMap<Uuid, i64>>;

    /// Points earned since `since` for the given users; users without logs are absent
    async fn sum_points_since(
        &self,
        user_ids: &[Uuid],
        since: DateTime<Utc>,
    ) -> RepoResult<HashMap<Uuid, i64>>;
}

// ============================================================================
// Notification Sink
// ============================================================================

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn create_notification(&self, notification: &Notification) -> RepoResult<()>;
}
