//! Reaction handlers

use axum::extract::State;
use engage_core::ReactionSummary;
use engage_service::{ApiResponse, ReactionService, ToggleReactionRequest, ToggleReactionResponse};

use crate::extractors::{AuthUser, OptionalAuthUser, ParsedPath, ReactionTargetPath, ValidatedJson};
use crate::response::{ApiJson, ApiResult};
use crate::state::AppState;

/// Add, switch, or remove the caller's reaction
///
/// POST /reactions
pub async fn toggle_reaction(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<ToggleReactionRequest>,
) -> ApiResult<ApiJson<ApiResponse<ToggleReactionResponse>>> {
    let delta = ReactionService::new(state.service_context())
        .toggle_reaction(
            auth.user_id,
            request.reference_id,
            request.reference_type,
            &request.emoji,
        )
        .await?;

    Ok(ApiJson(ApiResponse::new(ToggleReactionResponse::new(
        request.reference_id,
        request.reference_type,
        delta,
    ))))
}

/// Emoji counts, plus the caller's own emoji when identified
///
/// GET /reactions/{reference_type}/{reference_id}
pub async fn get_reactions(
    State(state): State<AppState>,
    OptionalAuthUser(auth): OptionalAuthUser,
    ParsedPath(path): ParsedPath<ReactionTargetPath>,
) -> ApiResult<ApiJson<ApiResponse<ReactionSummary>>> {
    let summary = ReactionService::new(state.service_context())
        .get_reactions(
            auth.map(|a| a.user_id),
            path.reference_id()?,
            path.reference_type()?,
        )
        .await?;
    Ok(ApiJson(ApiResponse::new(summary)))
}
