//! Notification entity - what the engine hands to the notification sink

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ReferenceType;

/// Titles in reaction notifications are cut to this many characters
pub const TITLE_PREVIEW_CHARS: usize = 20;

/// Notification type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Reaction,
    ReplyThread,
    ReplyPost,
    RankUp,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reaction => "reaction",
            Self::ReplyThread => "reply_thread",
            Self::ReplyPost => "reply_post",
            Self::RankUp => "rank_up",
        }
    }
}

/// Notification entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: Uuid,
    /// Recipient
    pub user_id: Uuid,
    pub actor_id: Option<Uuid>,
    pub entity_id: Uuid,
    pub entity_slug: Option<String>,
    pub entity_type: String,
    pub kind: NotificationKind,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    fn build(
        user_id: Uuid,
        actor_id: Option<Uuid>,
        entity_id: Uuid,
        entity_slug: Option<String>,
        entity_type: &str,
        kind: NotificationKind,
        message: String,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id,
            actor_id,
            entity_id,
            entity_slug,
            entity_type: entity_type.to_string(),
            kind,
            message,
            is_read: false,
            created_at: Utc::now(),
        }
    }

    /// Someone reacted to the recipient's thread or post
    pub fn reaction(
        author_id: Uuid,
        actor_id: Uuid,
        reference_id: Uuid,
        reference_type: ReferenceType,
        entity_slug: Option<String>,
        emoji: &str,
        title: Option<&str>,
    ) -> Self {
        let message = match title.filter(|t| !t.is_empty()) {
            Some(title) => format!(
                "Someone reacted with {emoji} to your {reference_type}: {}",
                truncate_title(title)
            ),
            None => format!("Someone reacted with {emoji} to your {reference_type}"),
        };
        Self::build(
            author_id,
            Some(actor_id),
            reference_id,
            entity_slug,
            reference_type.as_str(),
            NotificationKind::Reaction,
            message,
        )
    }

    /// Someone replied to the recipient's thread, or to their post when `to_post` is set
    pub fn reply(
        recipient_id: Uuid,
        actor_id: Uuid,
        thread_id: Uuid,
        thread_slug: &str,
        thread_title: &str,
        to_post: bool,
    ) -> Self {
        let (kind, message) = if to_post {
            (
                NotificationKind::ReplyPost,
                format!("Someone replied to your post in '{thread_title}'"),
            )
        } else {
            (
                NotificationKind::ReplyThread,
                format!("Someone commented on your thread '{thread_title}'"),
            )
        };
        Self::build(
            recipient_id,
            Some(actor_id),
            thread_id,
            Some(thread_slug.to_string()),
            ReferenceType::Thread.as_str(),
            kind,
            message,
        )
    }

    /// Self-addressed rank promotion notice
    pub fn rank_up(user_id: Uuid, old_rank: &str, new_rank: &str, points: i64) -> Self {
        let message = format!(
            "🎉 Selamat! Kamu naik rank dari {old_rank} ke {new_rank} dengan {points} poin!"
        );
        Self::build(
            user_id,
            Some(user_id),
            user_id,
            None,
            "user",
            NotificationKind::RankUp,
            message,
        )
    }
}

/// Cut a title to the preview length on a character boundary, appending `...` when cut
pub fn truncate_title(title: &str) -> String {
    match title.char_indices().nth(TITLE_PREVIEW_CHARS) {
        Some((byte_idx, _)) => format!("{}...", &title[..byte_idx]),
        None => title.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_title() {
        assert_eq!(truncate_title("short"), "short");
        assert_eq!(truncate_title("exactly twenty chars"), "exactly twenty chars");
        assert_eq!(
            truncate_title("this title is definitely longer"),
            "this title is defini..."
        );
        // multibyte titles cut on char boundaries
        assert_eq!(truncate_title(&"é".repeat(25)), format!("{}...", "é".repeat(20)));
    }

    #[test]
    fn test_reaction_message() {
        let n = Notification::reaction(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            ReferenceType::Thread,
            Some("slug".into()),
            "🔥",
            Some("A very long thread title indeed"),
        );
        assert_eq!(
            n.message,
            "Someone reacted with 🔥 to your thread: A very long thread t..."
        );
        assert_eq!(n.kind, NotificationKind::Reaction);
        assert!(!n.is_read);
    }

    #[test]
    fn test_reaction_message_without_title() {
        let n = Notification::reaction(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            ReferenceType::Post,
            None,
            "👍",
            None,
        );
        assert_eq!(n.message, "Someone reacted with 👍 to your post");
    }

    #[test]
    fn test_rank_up_is_self_addressed() {
        let user = Uuid::new_v4();
        let n = Notification::rank_up(user, "Pendatang", "Warga", 105);
        assert_eq!(n.user_id, user);
        assert_eq!(n.actor_id, Some(user));
        assert!(n.message.contains("dari Pendatang ke Warga dengan 105 poin"));
    }
}
