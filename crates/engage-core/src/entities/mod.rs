//! Domain entities - core business objects

mod content;
mod gamification;
mod notification;
mod reaction;
mod user;

pub use content::{NewPost, NewThread, Post, Thread, ThreadSummary};
pub use gamification::{
    ActionType, DailyCap, NewPointLog, PointLog, RecordOutcome, ScoreRow, UserStats,
    MAX_DAILY_THREAD_POINTS,
};
pub use notification::{truncate_title, Notification, NotificationKind};
pub use reaction::{Reaction, ReactionDelta, ReactionSummary, ReferenceType};
pub use user::User;
