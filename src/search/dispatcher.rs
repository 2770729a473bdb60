//! Category-to-strategy dispatch
//!
//! A lookup table from category to strategy profile; every category maps and
//! `General` is the fallback, so dispatch can never miss. Emits per-query
//! telemetry as structured log entries; advisory only, never blocks or fails
//! the search.

use std::collections::HashMap;
use std::time::Instant;

use tracing::info;

use super::profiles::profile_for;
use super::strategy::StrategyEngine;
use super::strategy::StrategyProfile;
use super::strategy::StrategyReport;
use crate::models::Category;
use crate::models::SearchOptions;
use crate::models::SearchResult;

/// First characters of the query included in telemetry
const QUERY_PREFIX_CHARS: usize = 48;

pub struct StrategyDispatcher {
    engine: StrategyEngine,
    profiles: HashMap<Category, StrategyProfile>,
}

impl StrategyDispatcher {
    #[must_use]
    pub fn new(engine: StrategyEngine) -> Self {
        let profiles = Category::ALL
            .into_iter()
            .map(|category| (category, profile_for(category)))
            .collect();
        Self { engine, profiles }
    }

    /// The profile registered for a category; `General` if unmapped
    #[must_use]
    pub fn profile(&self, category: Category) -> &StrategyProfile {
        self.profiles
            .get(&category)
            .unwrap_or_else(|| &self.profiles[&Category::General])
    }

    /// Run the strategy registered for the category
    pub async fn dispatch(
        &self,
        query: &str,
        category: Category,
        options: &SearchOptions,
    ) -> (Vec<SearchResult>, StrategyReport) {
        let profile = self.profile(category);
        let started = Instant::now();

        let (results, report) = self.engine.run(profile, query, options).await;

        info!(
            target: "campusrag::search",
            query = %query_prefix(query),
            category = %category,
            structured_count = report.structured.count,
            structured_ms = report.structured.elapsed_ms,
            vector_count = report.vector.count,
            vector_ms = report.vector.elapsed_ms,
            keyword_count = report.keyword.count,
            keyword_ms = report.keyword.elapsed_ms,
            coverage_added = report.coverage_added,
            degraded = report.degraded,
            total_ms = started.elapsed().as_millis() as u64,
            "strategy dispatched"
        );

        (results, report)
    }
}

fn query_prefix(query: &str) -> String {
    if query.chars().count() > QUERY_PREFIX_CHARS {
        let truncated: String = query.chars().take(QUERY_PREFIX_CHARS).collect();
        format!("{truncated}...")
    } else {
        query.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_prefix_truncates_long_queries() {
        let long = "x".repeat(100);
        let prefix = query_prefix(&long);
        assert!(prefix.ends_with("..."));
        assert_eq!(prefix.chars().count(), QUERY_PREFIX_CHARS + 3);
    }

    #[test]
    fn query_prefix_keeps_short_queries_intact() {
        assert_eq!(query_prefix("short"), "short");
    }
}
