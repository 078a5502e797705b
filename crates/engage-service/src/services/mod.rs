//! Business logic services
//!
//! Each service borrows the shared [`ServiceContext`]; background work clones the
//! context into a task queue job.

pub mod content;
pub mod context;
pub mod error;
pub mod gamification;
pub mod notification;
pub mod rate_limit;
pub mod reaction;
pub mod trending;
pub mod view;

// Re-export all services for convenience
pub use content::ContentService;
pub use context::{EngineSettings, ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use gamification::{
    AwardOutcome, AwardRequest, GamificationService, RankChange, MAX_LEADERBOARD_LIMIT,
};
pub use notification::{FanoutNotificationSink, NotificationService};
pub use rate_limit::{RateLimitGuard, RateLimitService};
pub use reaction::{ReactionService, ReferenceOwner};
pub use trending::{TrendingService, MAX_TRENDING_LIMIT};
pub use view::{start_view_sync_worker, SyncReport, ViewService};
