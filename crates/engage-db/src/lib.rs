//! # engage-db
//!
//! Database layer implementing the engage-core repository traits with PostgreSQL via SQLx.
//!
//! - Connection pool management and schema migrations
//! - Database models with SQLx `FromRow` derives
//! - Model → entity mappers
//! - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use engage_db::{create_pool, run_migrations, PgLeaderboardRepository};
//!
//! async fn example(config: &engage_common::DatabaseConfig) -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(config).await?;
//!     run_migrations(&pool).await?;
//!     let leaderboard = PgLeaderboardRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, run_migrations, PgPool, MIGRATIONS_DIR};
pub use repositories::{
    PgLeaderboardRepository, PgNotificationRepository, PgPostRepository, PgReactionRepository,
    PgThreadRepository, PgUserRepository,
};
