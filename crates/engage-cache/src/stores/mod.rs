//! Redis implementations of the engage-core store ports

mod rate_limit;
mod reaction_counts;
mod view_counter;

pub use rate_limit::RedisRateLimitStore;
pub use reaction_counts::{RedisReactionCountCache, COUNTS_TTL_SECS};
pub use view_counter::{RedisViewCounter, VIEW_DEDUP_TTL_SECS};
