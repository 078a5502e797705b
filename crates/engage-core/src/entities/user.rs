//! User entity - the subset of the account record the scoring engine reads

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// User account (owned by the user module; read-only here)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
    pub role: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether this account is one of the designated bots that never earn points
    pub fn is_bot<S: AsRef<str>>(&self, bot_usernames: &[S]) -> bool {
        bot_usernames
            .iter()
            .any(|name| name.as_ref().eq_ignore_ascii_case(&self.username))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(username: &str) -> User {
        User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            avatar_url: None,
            role: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_is_bot() {
        let bots = ["Mading_Bot"];
        assert!(user("Mading_Bot").is_bot(&bots));
        assert!(user("mading_bot").is_bot(&bots));
        assert!(!user("alice").is_bot(&bots));
    }
}
