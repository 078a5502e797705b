//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in engage-core.

mod content;
mod error;
mod leaderboard;
mod notification;
mod reaction;
mod user;

pub use content::{PgPostRepository, PgThreadRepository};
pub use leaderboard::PgLeaderboardRepository;
pub use notification::PgNotificationRepository;
pub use reaction::PgReactionRepository;
pub use user::PgUserRepository;
