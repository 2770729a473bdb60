//! Final ordering and truncation of merged results
//!
//! Ranking applies a category's structural ordering where one is defined,
//! falling back to descending score, with a stable id tie-break so identical
//! inputs always produce identical ordered output. The assembler is a
//! bounded slice and never re-sorts.

use std::cmp::Ordering;

use crate::models::SearchResult;

/// How a category's results are ordered after the merge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderingPolicy {
    /// Descending score (the default)
    Score,
    /// Oldest first, for timeline-style content
    ChronologicalAsc,
    /// Newest first
    ChronologicalDesc,
    /// Fixed part sequence for multi-part content that must render in order
    /// regardless of score; the slice lists metadata `part` values
    Structural(&'static [&'static str]),
    /// Descending year buckets for period statistics
    YearDesc,
}

fn score_then_id(a: &SearchResult, b: &SearchResult) -> Ordering {
    b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id))
}

/// Chronological key: the `date` metadata string (ISO dates sort
/// lexicographically) falling back to `year`
fn date_key(result: &SearchResult) -> Option<String> {
    result
        .meta_str("date")
        .map(str::to_string)
        .or_else(|| result.meta_i64("year").map(|y| format!("{y:04}")))
}

fn structural_position(result: &SearchResult, sequence: &[&str]) -> usize {
    result
        .meta_str("part")
        .and_then(|part| sequence.iter().position(|s| *s == part))
        .unwrap_or(usize::MAX)
}

/// Order results under the given policy
///
/// Entries missing the structural/chronological key sort after the keyed
/// ones, by score. The id tie-break keeps output reproducible for equal keys
/// and equal scores.
#[must_use]
pub fn rank(mut results: Vec<SearchResult>, policy: OrderingPolicy) -> Vec<SearchResult> {
    match policy {
        OrderingPolicy::Score => results.sort_by(score_then_id),
        OrderingPolicy::ChronologicalAsc => results.sort_by(|a, b| {
            match (date_key(a), date_key(b)) {
                (Some(ka), Some(kb)) => ka.cmp(&kb).then_with(|| score_then_id(a, b)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => score_then_id(a, b),
            }
        }),
        OrderingPolicy::ChronologicalDesc => results.sort_by(|a, b| {
            match (date_key(a), date_key(b)) {
                (Some(ka), Some(kb)) => kb.cmp(&ka).then_with(|| score_then_id(a, b)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => score_then_id(a, b),
            }
        }),
        OrderingPolicy::Structural(sequence) => results.sort_by(|a, b| {
            structural_position(a, sequence)
                .cmp(&structural_position(b, sequence))
                .then_with(|| score_then_id(a, b))
        }),
        OrderingPolicy::YearDesc => results.sort_by(|a, b| {
            match (a.meta_i64("year"), b.meta_i64("year")) {
                (Some(ya), Some(yb)) => yb.cmp(&ya).then_with(|| score_then_id(a, b)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => score_then_id(a, b),
            }
        }),
    }
    results
}

/// Truncate ranked results to the caller's bound; never re-sorts
#[must_use]
pub fn assemble(mut ranked: Vec<SearchResult>, max_sections: usize) -> Vec<SearchResult> {
    ranked.truncate(max_sections);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use crate::models::SourceTag;
    use serde_json::Map;
    use serde_json::Value;

    fn result(id: &str, score: f32, meta: &[(&str, &str)]) -> SearchResult {
        let mut metadata = Map::new();
        for (k, v) in meta {
            metadata.insert((*k).to_string(), Value::String((*v).to_string()));
        }
        SearchResult {
            id: id.to_string(),
            section: "general".to_string(),
            kind: "profile".to_string(),
            text: String::new(),
            score,
            metadata,
            keywords: Vec::new(),
            category: Category::General,
            source: SourceTag::Structured,
        }
    }

    const HYMN_SEQUENCE: &[&str] = &["verse1", "chorus", "verse2", "finalChorus"];

    #[test]
    fn structural_ordering_ignores_scores() {
        let ranked = rank(
            vec![
                result("d", 9.0, &[("part", "finalChorus")]),
                result("b", 0.1, &[("part", "chorus")]),
                result("a", 0.5, &[("part", "verse1")]),
                result("c", 7.0, &[("part", "verse2")]),
            ],
            OrderingPolicy::Structural(HYMN_SEQUENCE),
        );
        let parts: Vec<&str> = ranked.iter().filter_map(|r| r.meta_str("part")).collect();
        assert_eq!(parts, vec!["verse1", "chorus", "verse2", "finalChorus"]);
    }

    #[test]
    fn unknown_parts_sort_after_the_sequence() {
        let ranked = rank(
            vec![
                result("x", 9.0, &[("part", "bridge")]),
                result("a", 0.5, &[("part", "verse1")]),
            ],
            OrderingPolicy::Structural(HYMN_SEQUENCE),
        );
        assert_eq!(ranked[0].id, "a");
    }

    #[test]
    fn chronological_asc_orders_by_date_then_year() {
        let ranked = rank(
            vec![
                result("new", 9.0, &[("year", "1998")]),
                result("old", 0.1, &[("year", "1947")]),
                result("scoreless", 5.0, &[]),
            ],
            OrderingPolicy::ChronologicalAsc,
        );
        let ids: Vec<&str> = ranked.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["old", "new", "scoreless"]);
    }

    #[test]
    fn year_desc_buckets_recent_periods_first() {
        let ranked = rank(
            vec![
                result("y2019", 9.0, &[("year", "2019")]),
                result("y2024", 0.1, &[("year", "2024")]),
            ],
            OrderingPolicy::YearDesc,
        );
        assert_eq!(ranked[0].id, "y2024");
    }

    #[test]
    fn score_ordering_breaks_ties_by_id() {
        let ranked = rank(
            vec![result("b", 1.0, &[]), result("a", 1.0, &[]), result("c", 2.0, &[])],
            OrderingPolicy::Score,
        );
        let ids: Vec<&str> = ranked.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn assemble_truncates_without_reordering() {
        let ranked = rank(
            vec![result("a", 3.0, &[]), result("b", 2.0, &[]), result("c", 1.0, &[])],
            OrderingPolicy::Score,
        );
        let bounded = assemble(ranked, 2);
        assert_eq!(bounded.len(), 2);
        assert_eq!(bounded[0].id, "a");
        assert_eq!(bounded[1].id, "b");
    }
}
