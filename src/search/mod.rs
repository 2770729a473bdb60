//! Hybrid retrieval and ranking engine
//!
//! The core pipeline: query -> typo correction -> classification -> strategy
//! dispatch (structured + vector + keyword stages against the stores) ->
//! merge/dedup -> rank -> bounded assembly. Store or provider trouble
//! degrades the search instead of failing it; an empty result list is a
//! legitimate, reportable outcome.

pub mod classifier;
pub mod dispatcher;
pub mod merge;
pub mod profiles;
pub mod rank;
pub mod strategy;

pub use classifier::classify;
pub use classifier::ClassifierRule;
pub use classifier::RULES;
pub use dispatcher::StrategyDispatcher;
pub use merge::merge;
pub use profiles::profile_for;
pub use rank::assemble;
pub use rank::rank;
pub use rank::OrderingPolicy;
pub use strategy::StrategyEngine;
pub use strategy::StrategyProfile;
pub use strategy::StrategyReport;

use std::sync::Arc;

use tracing::debug;

use crate::config::RetrievalConfig;
use crate::embeddings::EmbeddingService;
use crate::errors::CampusRagError;
use crate::errors::Result;
use crate::models::Category;
use crate::models::SearchOptions;
use crate::models::SearchOutcome;
use crate::store::KnowledgeStore;
use crate::store::ScheduleStore;
use crate::typo::TypoCorrector;

/// Seed vocabulary for the typo corrector: every classifier phrase word
/// plus each profile's markers and entities
#[must_use]
pub fn domain_vocabulary() -> Vec<String> {
    let mut words: Vec<String> = RULES
        .iter()
        .flat_map(|rule| rule.phrases.iter())
        .flat_map(|phrase| phrase.split_whitespace())
        .map(str::to_lowercase)
        .collect();

    for category in Category::ALL {
        let profile = profile_for(category);
        words.extend(profile.markers.iter().map(|m| m.to_lowercase()));
        words.extend(profile.entities.iter().map(|e| e.to_lowercase()));
    }

    words.sort();
    words.dedup();
    words
}

/// The exposed search operation, wired from explicitly constructed
/// collaborators at process start
pub struct SearchService {
    corrector: TypoCorrector,
    dispatcher: StrategyDispatcher,
    embeddings: Arc<EmbeddingService>,
    defaults: RetrievalConfig,
}

impl SearchService {
    #[must_use]
    pub fn new(
        knowledge: Arc<dyn KnowledgeStore>,
        schedule: Arc<dyn ScheduleStore>,
        embeddings: Arc<EmbeddingService>,
        corrector: TypoCorrector,
        retrieval: RetrievalConfig,
    ) -> Self {
        let engine = StrategyEngine::new(
            knowledge,
            schedule,
            embeddings.clone(),
            std::time::Duration::from_millis(retrieval.stage_deadline_ms),
            retrieval.vector_k,
            retrieval.min_stage_results,
        );
        Self {
            corrector,
            dispatcher: StrategyDispatcher::new(engine),
            embeddings,
            defaults: retrieval,
        }
    }

    /// Default options from configuration
    #[must_use]
    pub fn default_options(&self) -> SearchOptions {
        SearchOptions {
            max_results: self.defaults.max_results,
            max_sections: self.defaults.max_sections,
            query_type: None,
            correct_typos: self.defaults.correct_typos,
        }
    }

    /// Run one search
    ///
    /// Fails fast only on invalid input. Store and provider failures degrade
    /// the outcome; a fully failed retrieval returns an empty, degraded
    /// outcome rather than an error.
    pub async fn search(&self, query: &str, options: SearchOptions) -> Result<SearchOutcome> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(CampusRagError::Validation("query must not be empty".to_string()));
        }

        let (effective_query, corrected_query) = if options.correct_typos {
            let (corrected, had_corrections) = self.corrector.correct(trimmed);
            if had_corrections {
                debug!("typo correction applied: {} -> {}", trimmed, corrected);
                (corrected.clone(), Some(corrected))
            } else {
                (trimmed.to_string(), None)
            }
        } else {
            (trimmed.to_string(), None)
        };

        let category = options
            .query_type
            .unwrap_or_else(|| classify(&effective_query));

        let (mut results, mut report) = self
            .dispatcher
            .dispatch(&effective_query, category, &options)
            .await;
        let mut ranking_category = category;

        // Empty category results fall back to general retrieval; absence of
        // category knowledge must not look like an error to the caller
        if results.is_empty() && category != Category::General {
            debug!("no {} results, falling back to general retrieval", category);
            let (fallback, fallback_report) = self
                .dispatcher
                .dispatch(&effective_query, Category::General, &options)
                .await;
            results = fallback;
            report.degraded = report.degraded || fallback_report.degraded;
            ranking_category = Category::General;
        }

        let policy = self.dispatcher.profile(ranking_category).ordering;
        let ranked = rank(results, policy);
        let bounded = assemble(ranked, options.max_sections);

        let cache_stats = self.embeddings.cache_stats().await;
        debug!(
            hits = cache_stats.hits,
            misses = cache_stats.misses,
            evictions = cache_stats.evictions,
            "embedding cache stats"
        );

        Ok(SearchOutcome {
            results: bounded,
            category,
            corrected_query,
            degraded: report.degraded,
        })
    }
}
