//! Database models (rows as SQLx decodes them)

mod content;
mod gamification;
mod reaction;
mod user;

pub use content::{PostModel, ThreadModel, TrendingThreadModel};
pub use gamification::{ScoreRowModel, UserStatsModel};
pub use reaction::{ReactionCountModel, ReactionModel};
pub use user::UserModel;
