//! Leaderboard handlers

use axum::extract::State;
use engage_core::Timeframe;
use engage_service::{ApiResponse, GamificationService, LeaderboardEntry, LeaderboardQuery};

use super::DEFAULT_PAGE_LIMIT;
use crate::extractors::QueryParams;
use crate::response::{ApiJson, ApiResult};
use crate::state::AppState;

/// Top users for `timeframe` (`all_time`, `weekly`, `monthly`)
///
/// GET /leaderboard?limit=&timeframe=
pub async fn get_leaderboard(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<LeaderboardQuery>,
) -> ApiResult<ApiJson<ApiResponse<Vec<LeaderboardEntry>>>> {
    let timeframe = Timeframe::parse_or_default(query.timeframe.as_deref());
    let entries = GamificationService::new(state.service_context())
        .get_leaderboard(query.limit.unwrap_or(DEFAULT_PAGE_LIMIT), timeframe)
        .await?;
    Ok(ApiJson(ApiResponse::new(entries)))
}
