//! Value objects - immutable types that represent scoring rules

mod rank;
mod scope;
mod timeframe;
mod trending;

pub use rank::{GamificationStatus, RankTier, WeeklyLabel, MAX_LEVEL};
pub use scope::RateLimitScope;
pub use timeframe::Timeframe;
pub use trending::{
    trending_score, AGE_OFFSET_HOURS, GRAVITY, REACTION_WEIGHT, REPLY_WEIGHT,
    TRENDING_WINDOW_DAYS,
};
