//! Merging and deduplication of partial result sets

use std::collections::HashMap;

use crate::models::SearchResult;

/// Combine partial result sets by item identity
///
/// On collision the entry with the higher score survives; the output never
/// carries two entries with the same `id`. Output order is normalized to
/// (score descending, id ascending) so later stages never observe map
/// iteration order.
#[must_use]
pub fn merge(partials: Vec<Vec<SearchResult>>) -> Vec<SearchResult> {
    let mut by_id: HashMap<String, SearchResult> = HashMap::new();

    for partial in partials {
        for result in partial {
            match by_id.get(&result.id) {
                Some(existing) if existing.score >= result.score => {}
                _ => {
                    by_id.insert(result.id.clone(), result);
                }
            }
        }
    }

    let mut merged: Vec<SearchResult> = by_id.into_values().collect();
    merged.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use crate::models::SourceTag;
    use serde_json::Map;

    fn result(id: &str, score: f32, source: SourceTag) -> SearchResult {
        SearchResult {
            id: id.to_string(),
            section: "general".to_string(),
            kind: "profile".to_string(),
            text: String::new(),
            score,
            metadata: Map::new(),
            keywords: Vec::new(),
            category: Category::General,
            source,
        }
    }

    #[test]
    fn collisions_keep_the_higher_score() {
        let merged = merge(vec![
            vec![result("a", 1.0, SourceTag::Structured)],
            vec![result("a", 3.0, SourceTag::Vector), result("b", 2.0, SourceTag::Vector)],
        ]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id, "a");
        assert_eq!(merged[0].score, 3.0);
        assert_eq!(merged[0].source, SourceTag::Vector);
    }

    #[test]
    fn equal_scores_keep_the_first_seen_entry() {
        let merged = merge(vec![
            vec![result("a", 2.0, SourceTag::Structured)],
            vec![result("a", 2.0, SourceTag::Keyword)],
        ]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].source, SourceTag::Structured);
    }

    #[test]
    fn no_duplicate_ids_survive() {
        let merged = merge(vec![
            vec![result("a", 1.0, SourceTag::Structured), result("a", 0.5, SourceTag::Structured)],
            vec![result("a", 0.2, SourceTag::Keyword)],
        ]);
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn output_order_is_score_then_id() {
        let merged = merge(vec![vec![
            result("b", 1.0, SourceTag::Structured),
            result("a", 1.0, SourceTag::Structured),
            result("c", 5.0, SourceTag::Structured),
        ]]);
        let ids: Vec<&str> = merged.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }
}
