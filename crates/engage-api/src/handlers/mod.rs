//! Route handlers
//!
//! All HTTP request handlers organized by domain.

pub mod health;
pub mod leaderboard;
pub mod reactions;
pub mod threads;
pub mod users;

/// Page size when `limit` is omitted
pub(crate) const DEFAULT_PAGE_LIMIT: i64 = 10;
