//! Time-decayed trending score
//!
//! The Postgres query in `engage-db` binds these same constants, so the SQL ordering
//! and [`trending_score`] stay in step.

/// Only threads created within this many days are ranked
pub const TRENDING_WINDOW_DAYS: i64 = 7;

pub const REACTION_WEIGHT: f64 = 5.0;
pub const REPLY_WEIGHT: f64 = 30.0;
pub const AGE_OFFSET_HOURS: f64 = 2.0;
pub const GRAVITY: f64 = 1.8;

/// `(views + 5*reactions + 30*replies) / (age_hours + 2)^1.8`
pub fn trending_score(views: i64, reactions: i64, replies: i64, age_hours: f64) -> f64 {
    let engagement =
        views as f64 + REACTION_WEIGHT * reactions as f64 + REPLY_WEIGHT * replies as f64;
    engagement / (age_hours.max(0.0) + AGE_OFFSET_HOURS).powf(GRAVITY)
}
