//! In-memory store implementations
//!
//! Snapshot-backed stores used by tests, fixtures and local development.
//! Relevance numbers follow the same contract as the Postgres stores: a base
//! of 1.0 plus a small bump per matched keyword, cosine similarity for the
//! vector path.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::ChunkFilter;
use super::EventFilter;
use super::KnowledgeStore;
use super::ScheduleStore;
use crate::errors::Result;
use crate::models::Chunk;
use crate::models::ScheduleEvent;
use crate::models::ScoredChunk;
use crate::models::ScoredEvent;

/// Knowledge store over an owned chunk snapshot
#[derive(Debug, Clone, Default)]
pub struct InMemoryKnowledgeStore {
    chunks: Vec<Chunk>,
}

impl InMemoryKnowledgeStore {
    #[must_use]
    pub fn new(chunks: Vec<Chunk>) -> Self {
        Self { chunks }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// All keywords in the snapshot; feeds the typo-corrector vocabulary
    #[must_use]
    pub fn vocabulary(&self) -> Vec<String> {
        let mut words: Vec<String> = self
            .chunks
            .iter()
            .flat_map(|c| c.keywords.iter().cloned())
            .collect();
        words.sort();
        words.dedup();
        words
    }

    fn matches_filter(chunk: &Chunk, filter: &ChunkFilter) -> bool {
        if let Some(section) = &filter.section {
            if !chunk.section.eq_ignore_ascii_case(section) {
                return false;
            }
        }
        if let Some(kind) = &filter.kind {
            if !chunk.kind.eq_ignore_ascii_case(kind) {
                return false;
            }
        }
        if let Some(category) = &filter.category {
            if !chunk.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        for (key, value) in &filter.metadata_equals {
            if chunk.meta_str(key) != Some(value.as_str()) {
                return false;
            }
        }
        if !filter.keywords_any.is_empty() {
            let hit = filter
                .keywords_any
                .iter()
                .any(|k| chunk.keywords.iter().any(|ck| ck.eq_ignore_ascii_case(k)));
            if !hit {
                return false;
            }
        }
        true
    }

    fn keyword_relevance(chunk: &Chunk, filter: &ChunkFilter) -> f32 {
        let matched = filter
            .keywords_any
            .iter()
            .filter(|k| chunk.keywords.iter().any(|ck| ck.eq_ignore_ascii_case(k)))
            .count();
        1.0 + 0.25 * matched as f32
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

#[async_trait]
impl KnowledgeStore for InMemoryKnowledgeStore {
    async fn filtered_query(&self, filter: &ChunkFilter, limit: usize) -> Result<Vec<ScoredChunk>> {
        let mut hits: Vec<ScoredChunk> = self
            .chunks
            .iter()
            .filter(|c| Self::matches_filter(c, filter))
            .map(|c| ScoredChunk {
                chunk: c.clone(),
                relevance: Self::keyword_relevance(c, filter),
            })
            .collect();

        hits.sort_by(|a, b| {
            b.relevance
                .total_cmp(&a.relevance)
                .then_with(|| a.chunk.id.cmp(&b.chunk.id))
        });
        hits.truncate(limit);
        Ok(hits)
    }

    async fn vector_search(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        let mut hits: Vec<ScoredChunk> = self
            .chunks
            .iter()
            .filter_map(|c| {
                let embedding = c.embedding.as_ref()?;
                Some(ScoredChunk {
                    chunk: c.clone(),
                    relevance: cosine_similarity(vector, embedding),
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.relevance
                .total_cmp(&a.relevance)
                .then_with(|| a.chunk.id.cmp(&b.chunk.id))
        });
        hits.truncate(k);
        Ok(hits)
    }

    async fn keyword_query(&self, terms: &[String], limit: usize) -> Result<Vec<ScoredChunk>> {
        let lowered: Vec<String> = terms.iter().map(|t| t.to_lowercase()).collect();
        let mut hits: Vec<ScoredChunk> = self
            .chunks
            .iter()
            .filter_map(|c| {
                let text = c.text.to_lowercase();
                let matched = lowered
                    .iter()
                    .filter(|t| {
                        text.contains(t.as_str())
                            || c.keywords.iter().any(|k| k.eq_ignore_ascii_case(t))
                    })
                    .count();
                (matched > 0).then(|| ScoredChunk {
                    chunk: c.clone(),
                    relevance: matched as f32,
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.relevance
                .total_cmp(&a.relevance)
                .then_with(|| a.chunk.id.cmp(&b.chunk.id))
        });
        hits.truncate(limit);
        Ok(hits)
    }
}

/// Schedule store over an owned event snapshot
#[derive(Debug, Clone, Default)]
pub struct InMemoryScheduleStore {
    events: Vec<ScheduleEvent>,
}

impl InMemoryScheduleStore {
    #[must_use]
    pub fn new(events: Vec<ScheduleEvent>) -> Self {
        Self { events }
    }

    fn matches_filter(event: &ScheduleEvent, filter: &EventFilter) -> bool {
        if let Some(category) = &filter.category {
            if !event.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if let Some(semester) = &filter.semester {
            if event.semester.as_deref() != Some(semester.as_str()) {
                return false;
            }
        }
        if let Some(from) = filter.from_date {
            let effective_end: NaiveDate = event.end_date.unwrap_or(event.start_date);
            if effective_end < from {
                return false;
            }
        }
        if let Some(to) = filter.to_date {
            if event.start_date > to {
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl ScheduleStore for InMemoryScheduleStore {
    async fn filtered_query(&self, filter: &EventFilter, limit: usize) -> Result<Vec<ScoredEvent>> {
        let mut hits: Vec<ScoredEvent> = self
            .events
            .iter()
            .filter(|e| Self::matches_filter(e, filter))
            .map(|e| ScoredEvent {
                event: e.clone(),
                relevance: 1.0,
            })
            .collect();

        hits.sort_by(|a, b| {
            a.event
                .start_date
                .cmp(&b.event.start_date)
                .then_with(|| a.event.id.cmp(&b.event.id))
        });
        hits.truncate(limit);
        Ok(hits)
    }

    async fn vector_search(&self, _vector: &[f32], k: usize) -> Result<Vec<ScoredEvent>> {
        // Events carry no embeddings in the in-memory snapshot; fall back to
        // the soonest events so the vector stage still contributes candidates.
        let mut hits: Vec<ScoredEvent> = self
            .events
            .iter()
            .map(|e| ScoredEvent {
                event: e.clone(),
                relevance: 0.5,
            })
            .collect();
        hits.sort_by(|a, b| {
            a.event
                .start_date
                .cmp(&b.event.start_date)
                .then_with(|| a.event.id.cmp(&b.event.id))
        });
        hits.truncate(k);
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn chunk(id: &str, section: &str, keywords: &[&str]) -> Chunk {
        Chunk {
            id: id.to_string(),
            section: section.to_string(),
            kind: "profile".to_string(),
            category: section.to_string(),
            text: format!("text for {id}"),
            keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
            metadata: Map::new(),
            embedding: Some(vec![1.0, 0.0, 0.0]),
        }
    }

    #[tokio::test]
    async fn filtered_query_applies_section_and_keywords() {
        let store = InMemoryKnowledgeStore::new(vec![
            chunk("a", "leadership", &["president"]),
            chunk("b", "programs", &["bachelor"]),
        ]);

        let filter = ChunkFilter::for_section("leadership").with_keywords(&["president"]);
        let hits = store.filtered_query(&filter, 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].chunk.id, "a");
        assert!(hits[0].relevance > 1.0);
    }

    #[tokio::test]
    async fn vector_search_ranks_by_similarity() {
        let mut far = chunk("far", "general", &[]);
        far.embedding = Some(vec![0.0, 1.0, 0.0]);
        let near = chunk("near", "general", &[]);

        let store = InMemoryKnowledgeStore::new(vec![far, near]);
        let hits = store.vector_search(&[1.0, 0.0, 0.0], 2).await.unwrap();
        assert_eq!(hits[0].chunk.id, "near");
        assert!(hits[0].relevance > hits[1].relevance);
    }

    #[tokio::test]
    async fn keyword_query_matches_text_substrings() {
        let store = InMemoryKnowledgeStore::new(vec![chunk("a", "general", &[])]);
        let hits = store
            .keyword_query(&["text for a".to_string()], 5)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn event_date_range_filters_out_past_events() {
        let past = ScheduleEvent {
            id: "past".to_string(),
            title: "Orientation".to_string(),
            description: "freshmen".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 8, 1).unwrap(),
            end_date: None,
            time: None,
            category: "academic".to_string(),
            semester: None,
        };
        let upcoming = ScheduleEvent {
            start_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            id: "soon".to_string(),
            ..past.clone()
        };
        let store = InMemoryScheduleStore::new(vec![past, upcoming]);

        let filter = EventFilter {
            from_date: NaiveDate::from_ymd_opt(2025, 1, 1),
            ..EventFilter::default()
        };
        let hits = store.filtered_query(&filter, 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].event.id, "soon");
    }
}
