//! Gamification ledger entities - point logs, per-user totals, leaderboard rows

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Credited thread creations per user per calendar day
pub const MAX_DAILY_THREAD_POINTS: i64 = 3;

/// Actions that earn points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    CreateThread,
    CommentReceived,
    LikeReceived,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateThread => "create_thread",
            Self::CommentReceived => "comment_received",
            Self::LikeReceived => "like_received",
        }
    }

    /// Fixed point value of the action
    pub fn points(&self) -> i32 {
        match self {
            Self::CreateThread => 2,
            Self::CommentReceived => 5,
            Self::LikeReceived => 10,
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create_thread" => Ok(Self::CreateThread),
            "comment_received" => Ok(Self::CommentReceived),
            "like_received" => Ok(Self::LikeReceived),
            other => Err(DomainError::ValidationError(format!(
                "unknown action type: {other}"
            ))),
        }
    }
}

/// Append-only point ledger row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointLog {
    pub id: i64,
    pub user_id: Uuid,
    pub action_type: ActionType,
    pub points: i32,
    pub reference_id: String,
    pub reference_table: String,
    /// User who triggered the award (the liker); `None` for self-earned actions
    pub actor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Point log about to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPointLog {
    pub user_id: Uuid,
    pub action_type: ActionType,
    pub points: i32,
    pub reference_id: String,
    pub reference_table: String,
    pub actor_id: Option<Uuid>,
    /// Checked inside the insert transaction when set
    pub daily_cap: Option<DailyCap>,
}

impl NewPointLog {
    /// Build a log entry valued from the point table
    pub fn new(
        user_id: Uuid,
        action_type: ActionType,
        reference_id: impl Into<String>,
        reference_table: impl Into<String>,
        actor_id: Option<Uuid>,
    ) -> Self {
        Self {
            user_id,
            action_type,
            points: action_type.points(),
            reference_id: reference_id.into(),
            reference_table: reference_table.into(),
            actor_id,
            daily_cap: None,
        }
    }

    /// Refuse the insert once the user holds `max` logs of this action since `since`
    #[must_use]
    pub fn with_daily_cap(mut self, since: DateTime<Utc>, max: i64) -> Self {
        self.daily_cap = Some(DailyCap { since, max });
        self
    }
}

/// Ceiling on logs of one action per user, counted from `since`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyCap {
    pub since: DateTime<Utc>,
    pub max: i64,
}

/// What happened to a point log handed to the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded,
    /// Same actor, action and reference already credited
    Duplicate,
    /// The log's daily cap was already used up
    CapReached,
}

/// Per-user running total. Only the all-time total is stored; windowed totals are
/// always derived from point logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserStats {
    pub user_id: Uuid,
    pub total_all_time: i64,
    pub last_updated_at: DateTime<Utc>,
}

impl UserStats {
    /// Zero stats for a user who has never earned points
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            total_all_time: 0,
            last_updated_at: Utc::now(),
        }
    }
}

/// Leaderboard query row: a user with the score the query ordered by
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRow {
    pub user_id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
    pub role: Option<String>,
    pub score: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_table() {
        assert_eq!(ActionType::CreateThread.points(), 2);
        assert_eq!(ActionType::CommentReceived.points(), 5);
        assert_eq!(ActionType::LikeReceived.points(), 10);
    }

    #[test]
    fn test_new_point_log_uses_point_table() {
        let actor = Uuid::new_v4();
        let log = NewPointLog::new(Uuid::new_v4(), ActionType::LikeReceived, "ref", "threads", Some(actor));
        assert_eq!(log.points, 10);
        assert_eq!(log.actor_id, Some(actor));
        assert_eq!(log.daily_cap, None);
    }

    #[test]
    fn test_with_daily_cap() {
        let since = Utc::now();
        let log = NewPointLog::new(Uuid::new_v4(), ActionType::CreateThread, "ref", "threads", None)
            .with_daily_cap(since, MAX_DAILY_THREAD_POINTS);
        assert_eq!(log.daily_cap, Some(DailyCap { since, max: 3 }));
    }

    #[test]
    fn test_action_type_parse() {
        assert_eq!(
            "like_received".parse::<ActionType>().unwrap(),
            ActionType::LikeReceived
        );
        assert!("received_like".parse::<ActionType>().is_err());
    }
}
