//! The shared three-stage retrieval engine
//!
//! Every category strategy is the same engine run with a different
//! [`StrategyProfile`]: a primary structured stage, a supplemental
//! vector-similarity stage and a keyword fallback, followed by the
//! coverage-guarantee step for enumeration-style categories. The three
//! stages have no data dependency on each other's results, so they run
//! concurrently under a per-stage deadline; whatever survives is merged.
//!
//! A stage failure (provider down, store error, deadline) is contained:
//! logged, marked degraded, and the search continues with the remaining
//! stages. Only all-stages-failed produces the empty outcome, and even that
//! is a normal result rather than an error.

use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use chrono::DateTime;
use chrono::Utc;
use tracing::warn;

use super::merge::merge;
use super::rank::OrderingPolicy;
use crate::embeddings::EmbeddingService;
use crate::errors::Result;
use crate::models::Category;
use crate::models::Chunk;
use crate::models::SearchOptions;
use crate::models::SearchResult;
use crate::models::SourceTag;
use crate::store::ChunkFilter;
use crate::store::EventFilter;
use crate::store::KnowledgeStore;
use crate::store::ScheduleStore;

/// Largest boost: the chunk's own category matches the strategy's
pub const BOOST_EXACT_CATEGORY: f32 = 3.0;
/// Exact entity/acronym match between query and chunk
pub const BOOST_ENTITY: f32 = 2.0;
/// Per marker-keyword hit, capped at two hits
pub const BOOST_MARKER: f32 = 0.5;
/// Recency of last update; tie-break only, never outranks a keyword hit
pub const BOOST_RECENCY_MAX: f32 = 0.1;
/// Fixed score for coverage-guarantee inclusions
pub const COVERAGE_SCORE: f32 = 10.0;
/// Scale for vector-stage similarity scores
const VECTOR_WEIGHT: f32 = 2.0;
/// Scale for keyword-fallback scores; lowest-confidence path by construction
const KEYWORD_WEIGHT: f32 = 0.2;
/// Keyword relevance contribution cap before scaling
const KEYWORD_RELEVANCE_CAP: f32 = 4.0;

/// Sub-entities that must all appear in enumeration-style results
#[derive(Debug, Clone, Copy)]
pub struct CoverageRule {
    /// Metadata key identifying the sub-entity, e.g. "faculty" or "part"
    pub key: &'static str,
    pub required: &'static [&'static str],
}

/// Category-specific parameters for the shared engine
#[derive(Debug, Clone)]
pub struct StrategyProfile {
    pub category: Category,
    /// Predicates for the primary structured stage, pooled in order
    pub filters: Vec<ChunkFilter>,
    /// Domain markers: boost terms, vector-stage plausibility, keyword fallback
    pub markers: &'static [&'static str],
    /// Entities/acronyms eligible for the exact-entity boost
    pub entities: &'static [&'static str],
    /// Terms appended to the query text before embedding
    pub enrich: &'static [&'static str],
    pub coverage: Option<CoverageRule>,
    pub ordering: OrderingPolicy,
    /// Route retrieval to the schedule store instead of the knowledge store
    pub schedule_source: bool,
}

/// Per-stage observability counters
#[derive(Debug, Clone, Copy, Default)]
pub struct StageStats {
    pub succeeded: bool,
    pub count: usize,
    pub elapsed_ms: u64,
}

/// What one strategy run did, for telemetry
#[derive(Debug, Clone, Copy, Default)]
pub struct StrategyReport {
    pub structured: StageStats,
    pub vector: StageStats,
    pub keyword: StageStats,
    pub coverage_added: usize,
    pub degraded: bool,
}

/// Shared stage engine with its injected collaborators
pub struct StrategyEngine {
    knowledge: Arc<dyn KnowledgeStore>,
    schedule: Arc<dyn ScheduleStore>,
    embeddings: Arc<EmbeddingService>,
    stage_deadline: Duration,
    vector_k: usize,
    min_stage_results: usize,
}

impl StrategyEngine {
    #[must_use]
    pub fn new(
        knowledge: Arc<dyn KnowledgeStore>,
        schedule: Arc<dyn ScheduleStore>,
        embeddings: Arc<EmbeddingService>,
        stage_deadline: Duration,
        vector_k: usize,
        min_stage_results: usize,
    ) -> Self {
        Self {
            knowledge,
            schedule,
            embeddings,
            stage_deadline,
            vector_k,
            min_stage_results,
        }
    }

    /// Run the three stages concurrently, merge survivors, then guarantee
    /// coverage of required sub-entities
    pub async fn run(
        &self,
        profile: &StrategyProfile,
        query: &str,
        options: &SearchOptions,
    ) -> (Vec<SearchResult>, StrategyReport) {
        let query_lc = query.to_lowercase();
        let mut report = StrategyReport::default();

        let (structured, vector, keyword) = tokio::join!(
            self.timed(profile, "structured", self.structured_stage(profile, &query_lc, options.max_results)),
            self.timed(profile, "vector", self.vector_stage(profile, query)),
            self.timed(profile, "keyword", self.keyword_stage(profile, &query_lc, options.max_results)),
        );

        let (structured_stats, structured_results) = structured;
        let (vector_stats, vector_results) = vector;
        let (keyword_stats, keyword_results) = keyword;
        report.structured = structured_stats;
        report.vector = vector_stats;
        report.keyword = keyword_stats;
        report.degraded =
            !(structured_stats.succeeded && vector_stats.succeeded && keyword_stats.succeeded);

        let mut merged = merge(vec![
            structured_results.unwrap_or_default(),
            vector_results.unwrap_or_default(),
        ]);

        // The keyword fallback only contributes when the higher-confidence
        // stages came up short; running it concurrently anyway trades a
        // little wasted work for tail latency.
        if merged.len() < self.min_stage_results {
            if let Some(keyword_results) = keyword_results {
                merged = merge(vec![merged, keyword_results]);
            }
        }

        if let Some(rule) = profile.coverage {
            let added = self.guarantee_coverage(profile, rule, &mut merged, &mut report).await;
            report.coverage_added = added;
        }

        (merged, report)
    }

    /// Wrap a stage future with the deadline and failure containment
    async fn timed(
        &self,
        profile: &StrategyProfile,
        stage: &str,
        fut: impl std::future::Future<Output = Result<Vec<SearchResult>>>,
    ) -> (StageStats, Option<Vec<SearchResult>>) {
        let started = Instant::now();
        let outcome = tokio::time::timeout(self.stage_deadline, fut).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(Ok(results)) => (
                StageStats {
                    succeeded: true,
                    count: results.len(),
                    elapsed_ms,
                },
                Some(results),
            ),
            Ok(Err(e)) => {
                warn!(
                    category = %profile.category,
                    stage,
                    error = %e,
                    "retrieval stage failed, continuing without it"
                );
                (StageStats { succeeded: false, count: 0, elapsed_ms }, None)
            }
            Err(_) => {
                warn!(
                    category = %profile.category,
                    stage,
                    deadline_ms = self.stage_deadline.as_millis() as u64,
                    "retrieval stage hit the deadline, continuing without it"
                );
                (StageStats { succeeded: false, count: 0, elapsed_ms }, None)
            }
        }
    }

    /// Stage 1: server-side filtered queries plus additive boosts
    async fn structured_stage(
        &self,
        profile: &StrategyProfile,
        query_lc: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        if profile.schedule_source {
            return self.structured_schedule_stage(profile, limit).await;
        }

        let mut out = Vec::new();
        for filter in &profile.filters {
            let hits = self.knowledge.filtered_query(filter, limit).await?;
            for hit in hits {
                let score = hit.relevance + boosts(profile, &hit.chunk, query_lc);
                out.push(SearchResult::from_chunk(
                    hit.chunk,
                    score,
                    profile.category,
                    SourceTag::Structured,
                ));
            }
        }
        Ok(out)
    }

    async fn structured_schedule_stage(
        &self,
        profile: &StrategyProfile,
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let filter = EventFilter {
            from_date: Some(Utc::now().date_naive()),
            ..EventFilter::default()
        };
        let hits = self.schedule.filtered_query(&filter, limit).await?;
        Ok(hits
            .into_iter()
            .map(|hit| {
                SearchResult::from_event(
                    hit.event,
                    hit.relevance,
                    profile.category,
                    SourceTag::Structured,
                )
            })
            .collect())
    }

    /// Stage 2: embed the enriched query, fetch nearest neighbors, keep the
    /// plausible members of the category
    async fn vector_stage(
        &self,
        profile: &StrategyProfile,
        query: &str,
    ) -> Result<Vec<SearchResult>> {
        let enriched = if profile.enrich.is_empty() {
            query.to_string()
        } else {
            format!("{query} {}", profile.enrich.join(" "))
        };
        let vector = self.embeddings.generate(&enriched).await?;

        if profile.schedule_source {
            let today = Utc::now().date_naive();
            let hits = self.schedule.vector_search(&vector, self.vector_k).await?;
            return Ok(hits
                .into_iter()
                // Finished events never belong in schedule answers
                .filter(|hit| hit.event.end_date.unwrap_or(hit.event.start_date) >= today)
                .map(|hit| {
                    SearchResult::from_event(
                        hit.event,
                        VECTOR_WEIGHT * hit.relevance,
                        profile.category,
                        SourceTag::Vector,
                    )
                })
                .collect());
        }

        let hits = self.knowledge.vector_search(&vector, self.vector_k).await?;
        Ok(hits
            .into_iter()
            .filter(|hit| plausible_for(profile, &hit.chunk))
            .map(|hit| {
                SearchResult::from_chunk(
                    hit.chunk,
                    VECTOR_WEIGHT * hit.relevance,
                    profile.category,
                    SourceTag::Vector,
                )
            })
            .collect())
    }

    /// Stage 3: substring/keyword fallback, scored below the other stages
    async fn keyword_stage(
        &self,
        profile: &StrategyProfile,
        query_lc: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        if profile.schedule_source {
            // The schedule store has no keyword path; the other stages carry it
            return Ok(Vec::new());
        }

        let mut terms: Vec<String> = profile.markers.iter().map(|m| (*m).to_string()).collect();
        terms.extend(
            query_lc
                .split_whitespace()
                .filter(|w| w.len() > 3)
                .map(str::to_string),
        );
        terms.sort();
        terms.dedup();

        let hits = self.knowledge.keyword_query(&terms, limit).await?;
        Ok(hits
            .into_iter()
            .map(|hit| {
                SearchResult::from_chunk(
                    hit.chunk,
                    KEYWORD_WEIGHT * hit.relevance.min(KEYWORD_RELEVANCE_CAP),
                    profile.category,
                    SourceTag::Keyword,
                )
            })
            .collect())
    }

    /// Force-include any missing required sub-entity via a direct targeted
    /// lookup; completeness beats pure relevance for enumeration queries
    async fn guarantee_coverage(
        &self,
        profile: &StrategyProfile,
        rule: CoverageRule,
        merged: &mut Vec<SearchResult>,
        report: &mut StrategyReport,
    ) -> usize {
        let mut additions = Vec::new();

        for value in rule.required {
            let covered = merged
                .iter()
                .any(|r| r.meta_str(rule.key).is_some_and(|v| v.eq_ignore_ascii_case(value)));
            if covered {
                continue;
            }

            let filter = ChunkFilter::default().with_metadata(rule.key, value);
            match self.knowledge.filtered_query(&filter, 1).await {
                Ok(hits) => {
                    for hit in hits {
                        additions.push(SearchResult::from_chunk(
                            hit.chunk,
                            COVERAGE_SCORE,
                            profile.category,
                            SourceTag::Coverage,
                        ));
                    }
                }
                Err(e) => {
                    warn!(
                        category = %profile.category,
                        key = rule.key,
                        value,
                        error = %e,
                        "coverage lookup failed"
                    );
                    report.degraded = true;
                }
            }
        }

        let added = additions.len();
        if added > 0 {
            let combined = merge(vec![std::mem::take(merged), additions]);
            *merged = combined;
        }
        added
    }
}

/// Additive, bounded score boosts on top of the store relevance number
fn boosts(profile: &StrategyProfile, chunk: &Chunk, query_lc: &str) -> f32 {
    let mut boost = 0.0;

    if chunk.category.eq_ignore_ascii_case(profile.category.as_str()) {
        boost += BOOST_EXACT_CATEGORY;
    }

    if entity_match(profile, chunk, query_lc) {
        boost += BOOST_ENTITY;
    }

    let text_lc = chunk.text.to_lowercase();
    let marker_hits = profile
        .markers
        .iter()
        .filter(|m| {
            chunk.keywords.iter().any(|k| k.eq_ignore_ascii_case(m)) || text_lc.contains(*m)
        })
        .take(2)
        .count();
    boost += BOOST_MARKER * marker_hits as f32;

    boost += recency_boost(chunk);
    boost
}

/// Entity boost applies when the query names an entity the chunk represents
fn entity_match(profile: &StrategyProfile, chunk: &Chunk, query_lc: &str) -> bool {
    profile.entities.iter().any(|entity| {
        let entity_lc = entity.to_lowercase();
        query_lc.contains(&entity_lc)
            && (chunk.meta_str("acronym").is_some_and(|a| a.eq_ignore_ascii_case(entity))
                || chunk.keywords.iter().any(|k| k.eq_ignore_ascii_case(entity)))
    })
}

/// Smallest boost: decays with the age of `last_updated`, whole-day
/// granularity so scores stay stable across a query's lifetime
fn recency_boost(chunk: &Chunk) -> f32 {
    let Some(updated) = chunk
        .meta_str("last_updated")
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
    else {
        return 0.0;
    };

    let age_days = (Utc::now().date_naive() - updated.date_naive()).num_days().max(0);
    BOOST_RECENCY_MAX / (1.0 + age_days as f32 / 365.0)
}

/// Vector-stage post-filter: does this chunk plausibly belong to the
/// strategy's category?
fn plausible_for(profile: &StrategyProfile, chunk: &Chunk) -> bool {
    if profile.category == Category::General {
        return true;
    }
    if chunk.category.eq_ignore_ascii_case(profile.category.as_str()) {
        return true;
    }

    let text_lc = chunk.text.to_lowercase();
    profile.markers.iter().any(|m| {
        chunk.section.to_lowercase().contains(m)
            || chunk.kind.to_lowercase().contains(m)
            || chunk.keywords.iter().any(|k| k.eq_ignore_ascii_case(m))
            || text_lc.contains(*m)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;
    use serde_json::Value;

    fn profile() -> StrategyProfile {
        StrategyProfile {
            category: Category::Deans,
            filters: vec![ChunkFilter::for_section("deans")],
            markers: &["dean", "faculty"],
            entities: &["FACET"],
            enrich: &[],
            coverage: None,
            ordering: OrderingPolicy::Score,
            schedule_source: false,
        }
    }

    fn chunk(category: &str, keywords: &[&str]) -> Chunk {
        Chunk {
            id: "c1".to_string(),
            section: "deans".to_string(),
            kind: "profile".to_string(),
            category: category.to_string(),
            text: "Dean profile".to_string(),
            keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
            metadata: Map::new(),
            embedding: None,
        }
    }

    #[test]
    fn category_match_is_the_largest_boost() {
        let p = profile();
        let exact = boosts(&p, &chunk("deans", &[]), "any query");
        let marker_only = boosts(&p, &chunk("other", &["dean"]), "any query");
        assert!(exact > marker_only);
        assert!(exact >= BOOST_EXACT_CATEGORY);
    }

    #[test]
    fn entity_boost_requires_query_and_chunk_agreement() {
        let p = profile();
        let mut facet_chunk = chunk("deans", &[]);
        facet_chunk
            .metadata
            .insert("acronym".to_string(), Value::String("FACET".to_string()));

        let with_entity = boosts(&p, &facet_chunk, "who is the dean of facet");
        let without_entity = boosts(&p, &facet_chunk, "who is the dean");
        assert!(with_entity > without_entity);
    }

    #[test]
    fn marker_boost_is_capped() {
        let p = profile();
        let many = boosts(&p, &chunk("other", &["dean", "faculty"]), "query");
        // Text also contains "dean"; the cap keeps total marker boost at two hits
        assert!(many <= 2.0 * BOOST_MARKER + f32::EPSILON);
    }

    #[test]
    fn recency_boost_stays_within_bounds() {
        let mut recent = chunk("other", &[]);
        recent.metadata.insert(
            "last_updated".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
        let boost = recency_boost(&recent);
        assert!(boost > 0.0);
        assert!(boost <= BOOST_RECENCY_MAX);
    }

    #[test]
    fn plausibility_accepts_marker_bearing_chunks_only() {
        let p = profile();
        assert!(plausible_for(&p, &chunk("other", &["dean"])));

        let mut unrelated = chunk("other", &[]);
        unrelated.section = "cafeteria".to_string();
        unrelated.kind = "menu".to_string();
        unrelated.text = "Lunch options".to_string();
        assert!(!plausible_for(&p, &unrelated));
    }
}
