use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

/// Query categories detected by the classifier
///
/// Each category maps to exactly one retrieval strategy. `General` is the
/// fall-through for queries no rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    General,
    Comprehensive,
    History,
    Leadership,
    Deans,
    Office,
    Programs,
    Faculties,
    StudentOrg,
    Admission,
    Hymn,
    VisionMission,
    Values,
    Schedule,
    Scholarship,
}

impl Category {
    /// Every category, in declaration order
    pub const ALL: [Self; 15] = [
        Self::General,
        Self::Comprehensive,
        Self::History,
        Self::Leadership,
        Self::Deans,
        Self::Office,
        Self::Programs,
        Self::Faculties,
        Self::StudentOrg,
        Self::Admission,
        Self::Hymn,
        Self::VisionMission,
        Self::Values,
        Self::Schedule,
        Self::Scholarship,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Comprehensive => "comprehensive",
            Self::History => "history",
            Self::Leadership => "leadership",
            Self::Deans => "deans",
            Self::Office => "office",
            Self::Programs => "programs",
            Self::Faculties => "faculties",
            Self::StudentOrg => "student-org",
            Self::Admission => "admission",
            Self::Hymn => "hymn",
            Self::VisionMission => "vision-mission",
            Self::Values => "values",
            Self::Schedule => "schedule",
            Self::Scholarship => "scholarship",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = crate::CampusRagError;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s.to_lowercase())
            .ok_or_else(|| crate::CampusRagError::Validation(format!("unknown category: {s}")))
    }
}

/// A unit of retrievable knowledge
///
/// Chunks are created and replaced in bulk by the external ingestion process;
/// the retrieval core only ever reads them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Globally unique identifier
    pub id: String,
    /// Classification label, e.g. "university_identity", "leadership"
    pub section: String,
    /// Content shape label, e.g. "profile", "timeline_entry", "hymn_part"
    pub kind: String,
    /// Ingestion-assigned category label
    pub category: String,
    /// Natural-language content
    pub text: String,
    /// Normalized terms, order irrelevant
    pub keywords: Vec<String>,
    /// Open attribute bag: person names, years, acronyms, part labels,
    /// `last_updated` RFC 3339 timestamps
    pub metadata: Map<String, Value>,
    /// Fixed-length vector, immutable once created
    pub embedding: Option<Vec<f32>>,
}

impl Chunk {
    /// Look up a metadata value as a string, if present
    #[must_use]
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }
}

/// A calendar/announcement item from the schedule store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEvent {
    pub id: String,
    pub title: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub time: Option<String>,
    pub category: String,
    pub semester: Option<String>,
}

/// A chunk plus the store-computed base relevance number
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub relevance: f32,
}

/// An event plus the store-computed base relevance number
#[derive(Debug, Clone)]
pub struct ScoredEvent {
    pub event: ScheduleEvent,
    pub relevance: f32,
}

/// Which retrieval stage produced a result, for observability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceTag {
    /// Primary server-side filtered query
    Structured,
    /// Vector-similarity supplement
    Vector,
    /// Keyword/substring fallback
    Keyword,
    /// Coverage-guarantee targeted lookup
    Coverage,
}

/// Ephemeral per-query result wrapping a chunk or schedule event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub section: String,
    pub kind: String,
    pub text: String,
    /// Non-negative, recomputed every query, never persisted
    pub score: f32,
    pub metadata: Map<String, Value>,
    pub keywords: Vec<String>,
    pub category: Category,
    pub source: SourceTag,
}

impl SearchResult {
    #[must_use]
    pub fn from_chunk(chunk: Chunk, score: f32, category: Category, source: SourceTag) -> Self {
        Self {
            id: chunk.id,
            section: chunk.section,
            kind: chunk.kind,
            text: chunk.text,
            score: score.max(0.0),
            metadata: chunk.metadata,
            keywords: chunk.keywords,
            category,
            source,
        }
    }

    /// Flatten a schedule event into the common result shape; dates, time and
    /// semester land in the metadata bag
    #[must_use]
    pub fn from_event(event: ScheduleEvent, score: f32, category: Category, source: SourceTag) -> Self {
        let mut metadata = Map::new();
        metadata.insert("date".to_string(), Value::String(event.start_date.to_string()));
        if let Some(end) = event.end_date {
            metadata.insert("end_date".to_string(), Value::String(end.to_string()));
        }
        if let Some(time) = event.time {
            metadata.insert("time".to_string(), Value::String(time));
        }
        if let Some(semester) = event.semester {
            metadata.insert("semester".to_string(), Value::String(semester));
        }

        Self {
            id: event.id,
            section: "schedule".to_string(),
            kind: "schedule_event".to_string(),
            text: format!("{}: {}", event.title, event.description),
            score: score.max(0.0),
            metadata,
            keywords: Vec::new(),
            category,
            source,
        }
    }

    /// Metadata value as a string, if present
    #[must_use]
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }

    /// Metadata value as an integer; accepts both numeric and string forms
    #[must_use]
    pub fn meta_i64(&self, key: &str) -> Option<i64> {
        match self.metadata.get(key) {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.parse().ok(),
            _ => None,
        }
    }
}

/// Caller-supplied search options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Per-stage fetch bound
    pub max_results: usize,
    /// Final result bound after ranking
    pub max_sections: usize,
    /// Explicit category override; skips the classifier when set
    pub query_type: Option<Category>,
    /// Run the typo corrector before classification
    pub correct_typos: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_results: 20,
            max_sections: 8,
            query_type: None,
            correct_typos: true,
        }
    }
}

/// The outcome of one search: bounded ordered results plus markers
///
/// An empty result list is a legitimate outcome, not an error; `degraded`
/// records that one or more retrieval stages failed along the way.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub results: Vec<SearchResult>,
    pub category: Category,
    pub corrected_query: Option<String>,
    pub degraded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_through_strings() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!("registrar-hotline".parse::<Category>().is_err());
    }

    #[test]
    fn event_flattening_preserves_dates_in_metadata() {
        let event = ScheduleEvent {
            id: "ev-1".to_string(),
            title: "Midterm examinations".to_string(),
            description: "All faculties".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 10, 13).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 10, 17),
            time: None,
            category: "academic".to_string(),
            semester: Some("1st".to_string()),
        };

        let result = SearchResult::from_event(event, 1.0, Category::Schedule, SourceTag::Structured);
        assert_eq!(result.meta_str("date"), Some("2025-10-13"));
        assert_eq!(result.meta_str("semester"), Some("1st"));
        assert!(result.text.starts_with("Midterm examinations"));
    }

    #[test]
    fn negative_scores_are_clamped() {
        let event = ScheduleEvent {
            id: "ev-2".to_string(),
            title: "t".to_string(),
            description: "d".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: None,
            time: None,
            category: "academic".to_string(),
            semester: None,
        };
        let result = SearchResult::from_event(event, -2.0, Category::Schedule, SourceTag::Vector);
        assert_eq!(result.score, 0.0);
    }
}
