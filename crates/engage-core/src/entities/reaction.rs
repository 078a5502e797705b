//! Reaction entity - a user's single emoji reaction on a thread, post, or menfess

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Kind of content a reaction (or notification) attaches to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceType {
    Thread,
    Post,
    /// Anonymous confession posts. Reactions here never award points or notify.
    Menfess,
}

impl ReferenceType {
    /// Wire/storage name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Thread => "thread",
            Self::Post => "post",
            Self::Menfess => "menfess",
        }
    }

    /// Table name recorded in point logs for this reference kind
    pub fn reference_table(&self) -> &'static str {
        match self {
            Self::Thread => "threads",
            Self::Post => "posts",
            Self::Menfess => "menfess",
        }
    }

    /// Whether reactions on this kind must stay anonymous
    #[inline]
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Menfess)
    }
}

impl fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReferenceType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "thread" => Ok(Self::Thread),
            "post" => Ok(Self::Post),
            "menfess" => Ok(Self::Menfess),
            other => Err(DomainError::InvalidReferenceType(other.to_string())),
        }
    }
}

/// Reaction entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub user_id: Uuid,
    pub reference_id: Uuid,
    pub reference_type: ReferenceType,
    pub emoji: String,
    pub created_at: DateTime<Utc>,
}

impl Reaction {
    /// Create a new Reaction
    pub fn new(
        user_id: Uuid,
        reference_id: Uuid,
        reference_type: ReferenceType,
        emoji: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            reference_id,
            reference_type,
            emoji: emoji.into(),
            created_at: Utc::now(),
        }
    }

    /// Check if reaction uses a specific emoji
    #[inline]
    pub fn is_emoji(&self, emoji: &str) -> bool {
        self.emoji == emoji
    }
}

/// State transition produced by a toggle: what was active before and what is active now.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReactionDelta {
    pub old_emoji: Option<String>,
    pub new_emoji: Option<String>,
}

impl ReactionDelta {
    /// First reaction on the reference
    pub fn added(emoji: impl Into<String>) -> Self {
        Self {
            old_emoji: None,
            new_emoji: Some(emoji.into()),
        }
    }

    /// Same emoji clicked again
    pub fn removed(emoji: impl Into<String>) -> Self {
        Self {
            old_emoji: Some(emoji.into()),
            new_emoji: None,
        }
    }

    /// Switched from one emoji to another
    pub fn switched(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            old_emoji: Some(old.into()),
            new_emoji: Some(new.into()),
        }
    }

    /// The emoji that became active, if any
    pub fn activated(&self) -> Option<&str> {
        self.new_emoji.as_deref()
    }

    /// Per-emoji count changes this transition implies
    pub fn increments(&self) -> Vec<(&str, i64)> {
        let mut changes = Vec::with_capacity(2);
        if let Some(old) = self.old_emoji.as_deref() {
            changes.push((old, -1));
        }
        if let Some(new) = self.new_emoji.as_deref() {
            changes.push((new, 1));
        }
        changes
    }
}

/// Reaction counts for a reference plus the caller's own active emoji
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReactionSummary {
    pub counts: HashMap<String, i64>,
    pub user_reacted: Option<String>,
}

impl ReactionSummary {
    /// Build a summary, dropping zero and negative counts
    pub fn new(counts: HashMap<String, i64>, user_reacted: Option<String>) -> Self {
        Self {
            counts: counts.into_iter().filter(|(_, count)| *count > 0).collect(),
            user_reacted,
        }
    }
}
