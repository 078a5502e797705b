//! Content entities - threads and posts (replies) as the scoring engine sees them

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Thread entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thread {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub views: i64,
    pub created_at: DateTime<Utc>,
}

/// Post (reply) entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: Uuid,
    pub thread_id: Uuid,
    pub user_id: Uuid,
    /// Post being replied to; `None` for a top-level reply on the thread
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Thread about to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewThread {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
}

impl NewThread {
    /// Build a new thread with a time-ordered id and a slug derived from the title
    pub fn new(user_id: Uuid, title: impl Into<String>, content: impl Into<String>) -> Self {
        let id = Uuid::now_v7();
        let title = title.into();
        let slug = slugify(&title, id);
        Self {
            id,
            user_id,
            title,
            slug,
            content: content.into(),
        }
    }
}

/// Post about to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub id: Uuid,
    pub thread_id: Uuid,
    pub user_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
}

impl NewPost {
    /// Build a new reply with a time-ordered id
    pub fn new(
        thread_id: Uuid,
        user_id: Uuid,
        parent_id: Option<Uuid>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            thread_id,
            user_id,
            parent_id,
            content: content.into(),
        }
    }
}

/// Trending query row with its decayed score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadSummary {
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

/// Lowercase ASCII slug from the title, suffixed with the id's leading hex so it stays unique
fn slugify(title: &str, id: Uuid) -> String {
    let mut slug = String::with_capacity(title.len() + 9);
    let mut last_dash = true;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    if !last_dash {
        slug.push('-');
    }
    let simple = id.simple().to_string();
    slug.push_str(&simple[simple.len() - 8..]);
    slug
}
