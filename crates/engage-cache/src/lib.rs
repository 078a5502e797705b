//! # engage-cache
//!
//! Redis layer for the engagement engine.
//!
//! ## Key families
//!
//! - `counts:{type}:{id}`: reaction count hashes. Pure read optimization, always
//!   rebuildable from the `reactions` table.
//! - `thread:views:{id}`, `thread:user_view:{id}:{user}`, `pending:thread_views`:
//!   view accumulation not yet flushed to Postgres.
//! - `rate_limit:user:{id}:{scope}`: cooldown locks.
//! - `notifications:{user_id}`: pub/sub channel (publish only).
//!
//! Only the view and rate-limit families hold state with no database backing.
//!
//! ## Example
//!
//! ```ignore
//! use engage_cache::{RedisPool, RedisPoolConfig, RedisRateLimitStore};
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let limiter = RedisRateLimitStore::new(pool.clone());
//! ```

pub mod keys;
pub mod pool;
pub mod pubsub;
pub mod stores;

// Re-export pool types
pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};

// Re-export stores
pub use stores::{
    RedisRateLimitStore, RedisReactionCountCache, RedisViewCounter, COUNTS_TTL_SECS,
    VIEW_DEDUP_TTL_SECS,
};

// Re-export pubsub types
pub use pubsub::{NotificationEvent, RedisNotificationPublisher, NOTIFICATION_EVENT};
