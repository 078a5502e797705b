//! User handlers

use axum::extract::State;
use engage_core::GamificationStatus;
use engage_service::{ApiResponse, GamificationService};

use crate::extractors::{ParsedPath, UserIdPath};
use crate::response::{ApiJson, ApiResult};
use crate::state::AppState;

/// Rank, progress, and weekly activity of a user
///
/// GET /users/{user_id}/gamification
pub async fn get_gamification_status(
    State(state): State<AppState>,
    ParsedPath(path): ParsedPath<UserIdPath>,
) -> ApiResult<ApiJson<ApiResponse<GamificationStatus>>> {
    let status = GamificationService::new(state.service_context())
        .get_user_status(path.user_id()?)
        .await?;
    Ok(ApiJson(ApiResponse::new(status)))
}
