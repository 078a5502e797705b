//! Point ledger database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for user_stats table
#[derive(Debug, Clone, FromRow)]
pub struct UserStatsModel {
    pub user_id: Uuid,
    pub total_all_time: i64,
    pub last_updated_at: DateTime<Utc>,
}

/// Leaderboard row: user joined with the score the query ordered by
#[derive(Debug, Clone, FromRow)]
pub struct ScoreRowModel {
    pub user_id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
    pub role: Option<String>,
    pub score: i64,
}
