//! Route definitions
//!
//! All API routes organized by domain and mounted under /api/v1.

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{health, leaderboard, reactions, threads, users};
use crate::state::AppState;

/// Create the main API router with all routes
pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(health_routes())
        .nest("/api/v1", api_v1_routes())
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

/// API v1 routes
fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(reaction_routes())
        .merge(gamification_routes())
        .merge(thread_routes())
}

/// Reaction routes
fn reaction_routes() -> Router<AppState> {
    Router::new()
        .route("/reactions", post(reactions::toggle_reaction))
        .route(
            "/reactions/:reference_type/:reference_id",
            get(reactions::get_reactions),
        )
}

/// Leaderboard and user rank routes
fn gamification_routes() -> Router<AppState> {
    Router::new()
        .route("/leaderboard", get(leaderboard::get_leaderboard))
        .route(
            "/users/:user_id/gamification",
            get(users::get_gamification_status),
        )
}

/// Thread routes
fn thread_routes() -> Router<AppState> {
    Router::new()
        .route("/threads", post(threads::create_thread))
        .route("/threads/trending", get(threads::get_trending))
        .route("/threads/:thread_id/posts", post(threads::create_post))
        .route("/threads/:thread_id/views", post(threads::record_view))
}
