//! Read-only knowledge and schedule store interfaces
//!
//! The retrieval core consumes these as injected trait objects; the store
//! contents are created and replaced by an external ingestion process, so
//! every operation here is a read against a consistent snapshot.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::Result;
use crate::models::ScoredChunk;
use crate::models::ScoredEvent;

mod memory;
mod postgres;

pub use memory::InMemoryKnowledgeStore;
pub use memory::InMemoryScheduleStore;
pub use postgres::pool_from_config;
pub use postgres::PostgresKnowledgeStore;
pub use postgres::PostgresScheduleStore;

/// Server-side predicate for the primary structured stage
///
/// All set fields must match; `keywords_any` and `metadata_equals` contribute
/// to the store-computed relevance number on top of the filter itself.
#[derive(Debug, Clone, Default)]
pub struct ChunkFilter {
    pub section: Option<String>,
    pub kind: Option<String>,
    pub category: Option<String>,
    /// Exact metadata key/value pairs, e.g. ("faculty", "FACET")
    pub metadata_equals: Vec<(String, String)>,
    /// Match chunks carrying any of these normalized keywords
    pub keywords_any: Vec<String>,
}

impl ChunkFilter {
    #[must_use]
    pub fn for_section(section: &str) -> Self {
        Self {
            section: Some(section.to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: &str) -> Self {
        self.kind = Some(kind.to_string());
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata_equals.push((key.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn with_keywords(mut self, keywords: &[&str]) -> Self {
        self.keywords_any = keywords.iter().map(|k| (*k).to_string()).collect();
        self
    }
}

/// Server-side predicate over schedule events
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub category: Option<String>,
    pub semester: Option<String>,
    /// Keep events ending on or after this date
    pub from_date: Option<NaiveDate>,
    /// Keep events starting on or before this date
    pub to_date: Option<NaiveDate>,
}

/// Read-only store of knowledge chunks
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Server-side filtered query; each result carries a base relevance number
    async fn filtered_query(&self, filter: &ChunkFilter, limit: usize) -> Result<Vec<ScoredChunk>>;

    /// Nearest-neighbor lookup by embedding similarity
    async fn vector_search(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredChunk>>;

    /// Substring/keyword lookup, the lowest-confidence retrieval path
    async fn keyword_query(&self, terms: &[String], limit: usize) -> Result<Vec<ScoredChunk>>;
}

/// Read-only store of schedule events
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn filtered_query(&self, filter: &EventFilter, limit: usize) -> Result<Vec<ScoredEvent>>;

    async fn vector_search(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredEvent>>;
}
