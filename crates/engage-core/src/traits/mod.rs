//! Ports implemented by the infrastructure crates

mod repositories;
mod stores;

pub use repositories::{
    LeaderboardRepository, NotificationSink, PostRepository, ReactionRepository, RepoResult,
    ThreadRepository, UserRepository,
};
pub use stores::{RateLimitStore, ReactionCountCache, ViewCounterStore};
