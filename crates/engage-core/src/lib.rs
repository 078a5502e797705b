//! # engage-core
//!
//! Domain layer for the engagement scoring engine: entities, rank and trending rules,
//! and the ports (repository and store traits) the infrastructure crates implement.
//! This crate has zero dependencies on infrastructure (database, cache, web framework).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    truncate_title, ActionType, DailyCap, NewPointLog, NewPost, NewThread, Notification,
    NotificationKind, PointLog, Post, Reaction, ReactionDelta, ReactionSummary, RecordOutcome,
    ReferenceType, ScoreRow, Thread, ThreadSummary, User, UserStats, MAX_DAILY_THREAD_POINTS,
};
pub use error::DomainError;
pub use traits::{
    LeaderboardRepository, NotificationSink, PostRepository, RateLimitStore, ReactionCountCache,
    ReactionRepository, RepoResult, ThreadRepository, UserRepository, ViewCounterStore,
};
pub use value_objects::{
    trending_score, GamificationStatus, RankTier, RateLimitScope, Timeframe, WeeklyLabel,
    MAX_LEVEL,
};
