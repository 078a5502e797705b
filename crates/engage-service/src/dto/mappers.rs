//! Entity to DTO mappers

use engage_core::entities::{Post, ReactionDelta, ScoreRow, Thread};
use engage_core::{GamificationStatus, ReferenceType};
use uuid::Uuid;

use super::responses::{LeaderboardEntry, PostResponse, ThreadResponse, ToggleReactionResponse};

/// Role shown for accounts without an explicit one
pub const DEFAULT_ROLE: &str = "user";

impl LeaderboardEntry {
    pub fn new(row: ScoreRow, position: usize, gamification_status: GamificationStatus) -> Self {
        Self {
            user_id: row.user_id,
            username: row.username,
            avatar_url: row.avatar_url,
            role: row.role.unwrap_or_else(|| DEFAULT_ROLE.to_string()),
            position,
            gamification_status,
        }
    }
}

impl ToggleReactionResponse {
    pub fn new(reference_id: Uuid, reference_type: ReferenceType, delta: ReactionDelta) -> Self {
        Self {
            reference_id,
            reference_type,
            active: delta.new_emoji.is_some(),
            old_emoji: delta.old_emoji,
            new_emoji: delta.new_emoji,
        }
    }
}

impl From<Thread> for ThreadResponse {
    fn from(thread: Thread) -> Self {
        Self {
            id: thread.id,
            user_id: thread.user_id,
            title: thread.title,
            slug: thread.slug,
            content: thread.content,
            views: thread.views,
            created_at: thread.created_at,
        }
    }
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            thread_id: post.thread_id,
            user_id: post.user_id,
            parent_id: post.parent_id,
            content: post.content,
            created_at: post.created_at,
        }
    }
}
