//! Thread handlers
//!
//! Creation endpoints are rate limited per user; a refusal surfaces as 429 with
//! `Retry-After`.

use axum::extract::State;
use engage_core::ThreadSummary;
use engage_service::{
    ApiResponse, ContentService, CreatePostRequest, CreateThreadRequest, PostResponse,
    ThreadResponse, TrendingQuery, TrendingService, ViewResponse, ViewService,
};

use super::DEFAULT_PAGE_LIMIT;
use crate::extractors::{AuthUser, ParsedPath, QueryParams, ThreadIdPath, ValidatedJson};
use crate::response::{ApiJson, ApiResult, Created};
use crate::state::AppState;

/// Recent threads by decayed engagement score
///
/// GET /threads/trending?limit=
pub async fn get_trending(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<TrendingQuery>,
) -> ApiResult<ApiJson<ApiResponse<Vec<ThreadSummary>>>> {
    let threads = TrendingService::new(state.service_context())
        .get_trending_threads(query.limit.unwrap_or(DEFAULT_PAGE_LIMIT))
        .await?;
    Ok(ApiJson(ApiResponse::new(threads)))
}

/// Create a thread
///
/// POST /threads
pub async fn create_thread(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateThreadRequest>,
) -> ApiResult<Created<ApiJson<ApiResponse<ThreadResponse>>>> {
    let thread = ContentService::new(state.service_context())
        .create_thread(auth.user_id, &request.title, &request.content)
        .await?;
    Ok(Created(ApiJson(ApiResponse::new(thread.into()))))
}

/// Reply to a thread, or to a post within it
///
/// POST /threads/{thread_id}/posts
pub async fn create_post(
    State(state): State<AppState>,
    auth: AuthUser,
    ParsedPath(path): ParsedPath<ThreadIdPath>,
    ValidatedJson(request): ValidatedJson<CreatePostRequest>,
) -> ApiResult<Created<ApiJson<ApiResponse<PostResponse>>>> {
    let post = ContentService::new(state.service_context())
        .create_post(
            auth.user_id,
            path.thread_id()?,
            request.parent_id,
            &request.content,
        )
        .await?;
    Ok(Created(ApiJson(ApiResponse::new(post.into()))))
}

/// Count a view by the caller
///
/// POST /threads/{thread_id}/views
pub async fn record_view(
    State(state): State<AppState>,
    auth: AuthUser,
    ParsedPath(path): ParsedPath<ThreadIdPath>,
) -> ApiResult<ApiJson<ApiResponse<ViewResponse>>> {
    let thread_id = path.thread_id()?;
    let counted = ViewService::new(state.service_context())
        .increment_view(thread_id, auth.user_id)
        .await?;
    Ok(ApiJson(ApiResponse::new(ViewResponse { thread_id, counted })))
}
