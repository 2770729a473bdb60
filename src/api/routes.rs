//! API route definitions

use axum::routing::get;
use axum::routing::post;
use axum::Router;

use super::handlers;
use super::handlers::AppState;

/// Create RESTful API router
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Search endpoints
        .route("/search", post(handlers::search))
        .route("/categories", get(handlers::list_categories))
        // Schedule endpoints
        .route("/schedule/upcoming", get(handlers::upcoming_schedule))
        .with_state(state)
}
