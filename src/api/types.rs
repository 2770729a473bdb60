//! API request and response types

use serde::Deserialize;
use serde::Serialize;

use crate::models::SearchOutcome;
use crate::models::SearchResult;

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Search request
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_max_sections")]
    pub max_sections: usize,
    /// Explicit category override, e.g. "deans"
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_correct_typos")]
    pub correct_typos: bool,
}

fn default_max_results() -> usize {
    20
}

fn default_max_sections() -> usize {
    8
}

fn default_correct_typos() -> bool {
    true
}

/// Search response
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub category: String,
    pub corrected_query: Option<String>,
    pub degraded: bool,
}

impl From<SearchOutcome> for SearchResponse {
    fn from(outcome: SearchOutcome) -> Self {
        Self {
            results: outcome.results,
            category: outcome.category.to_string(),
            corrected_query: outcome.corrected_query,
            degraded: outcome.degraded,
        }
    }
}

/// Upcoming schedule query parameters
#[derive(Debug, Deserialize)]
pub struct UpcomingQuery {
    #[serde(default = "default_schedule_limit")]
    pub limit: usize,
    /// Restrict to one event category, e.g. "academic"
    #[serde(default)]
    pub category: Option<String>,
}

fn default_schedule_limit() -> usize {
    10
}
