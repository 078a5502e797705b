//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use engage_core::ReferenceType;

// ============================================================================
// Reaction Requests
// ============================================================================

/// Toggle reaction request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ToggleReactionRequest {
    pub reference_id: Uuid,

    pub reference_type: ReferenceType,

    #[validate(length(min = 1, max = 32, message = "Emoji must be 1-32 characters"))]
    pub emoji: String,
}

// ============================================================================
// Content Requests
// ============================================================================

/// Create thread request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateThreadRequest {
    #[validate(length(min = 3, max = 255, message = "Title must be 3-255 characters"))]
    pub title: String,

    #[validate(length(min = 1, message = "Content cannot be empty"))]
    pub content: String,
}

/// Create reply request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 10000, message = "Content must be 1-10000 characters"))]
    pub content: String,

    /// Post being replied to
    pub parent_id: Option<Uuid>,
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Leaderboard query parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<i64>,
    /// `all_time`, `weekly` or `monthly`; anything else means all-time
    pub timeframe: Option<String>,
}

/// Trending threads query parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrendingQuery {
    pub limit: Option<i64>,
}
