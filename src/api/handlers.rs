//! API request handlers

use std::sync::Arc;

use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use tracing::error;
use tracing::info;

use crate::api::types::*;
use crate::errors::CampusRagError;
use crate::models::Category;
use crate::models::ScheduleEvent;
use crate::models::SearchOptions;
use crate::search::SearchService;
use crate::store::EventFilter;
use crate::store::ScheduleStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub search_service: Arc<SearchService>,
    pub schedule_store: Arc<dyn ScheduleStore>,
}

/// Health check handler
pub async fn health() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

/// Run a search
pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<ApiResponse<SearchResponse>>, StatusCode> {
    info!("POST /api/search");

    let query_type = match request.category.as_deref() {
        Some(raw) => match raw.parse::<Category>() {
            Ok(category) => Some(category),
            Err(_) => {
                return Ok(Json(ApiResponse::error(format!("unknown category: {raw}"))));
            }
        },
        None => None,
    };

    let options = SearchOptions {
        max_results: request.max_results,
        max_sections: request.max_sections,
        query_type,
        correct_typos: request.correct_typos,
    };

    match state.search_service.search(&request.query, options).await {
        Ok(outcome) => Ok(Json(ApiResponse::success(SearchResponse::from(outcome)))),
        Err(CampusRagError::Validation(message)) => Ok(Json(ApiResponse::error(message))),
        Err(e) => {
            error!("Search failed: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// List the categories the classifier can produce
pub async fn list_categories() -> Json<ApiResponse<Vec<String>>> {
    let categories = Category::ALL.iter().map(ToString::to_string).collect();
    Json(ApiResponse::success(categories))
}

/// List upcoming schedule events
pub async fn upcoming_schedule(
    State(state): State<AppState>,
    Query(params): Query<UpcomingQuery>,
) -> Result<Json<ApiResponse<Vec<ScheduleEvent>>>, StatusCode> {
    info!("GET /api/schedule/upcoming?limit={}", params.limit);

    let filter = EventFilter {
        category: params.category,
        from_date: Some(Utc::now().date_naive()),
        ..EventFilter::default()
    };

    match state.schedule_store.filtered_query(&filter, params.limit).await {
        Ok(hits) => {
            let events: Vec<ScheduleEvent> = hits.into_iter().map(|h| h.event).collect();
            Ok(Json(ApiResponse::success(events)))
        }
        Err(e) => {
            error!("Error fetching schedule: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
