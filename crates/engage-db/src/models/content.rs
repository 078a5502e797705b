//! Thread and post database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for threads table
#[derive(Debug, Clone, FromRow)]
pub struct ThreadModel {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub views: i64,
    pub created_at: DateTime<Utc>,
}

/// Database model for posts table
#[derive(Debug, Clone, FromRow)]
pub struct PostModel {
    pub id: Uuid,
    pub thread_id: Uuid,
    pub user_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Trending query row
#[derive(Debug, Clone, FromRow)]
pub struct TrendingThreadModel {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub author_id: Uuid,
    pub views: i64,
    pub reaction_count: i64,
    pub reply_count: i64,
    pub created_at: DateTime<Utc>,
    pub score: f64,
}
