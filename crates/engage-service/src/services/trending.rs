//! Trending service

use chrono::Utc;
use engage_core::entities::ThreadSummary;
use tracing::instrument;

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Largest trending page
pub const MAX_TRENDING_LIMIT: i64 = 50;

/// Trending service
pub struct TrendingService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> TrendingService<'a> {
    /// Create a new TrendingService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Recent threads ordered by decayed engagement score
    #[instrument(skip(self))]
    pub async fn get_trending_threads(&self, limit: i64) -> ServiceResult<Vec<ThreadSummary>> {
        let limit = limit.clamp(1, MAX_TRENDING_LIMIT);
        Ok(self.ctx.thread_repo().trending(Utc::now(), limit).await?)
    }
}
