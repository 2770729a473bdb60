//! CLI output formatting utilities

use crate::models::SearchOutcome;

/// Safely truncate a string at character boundary (not byte boundary)
///
/// This prevents panics when truncating strings with multi-byte UTF-8
/// characters (emojis, etc.)
#[must_use]
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

/// Print a search outcome in a readable list form
pub fn print_search_outcome(outcome: &SearchOutcome) {
    println!("Category: {}", outcome.category);
    if let Some(corrected) = &outcome.corrected_query {
        println!("Corrected query: {corrected}");
    }
    if outcome.degraded {
        println!("⚠️  Degraded result: one or more retrieval stages failed");
    }

    if outcome.results.is_empty() {
        println!("No results found.");
        return;
    }

    println!("Found {} result(s):", outcome.results.len());
    for (idx, result) in outcome.results.iter().enumerate() {
        println!(
            "  {}. [{}] {} (score: {:.2}, source: {:?})",
            idx + 1,
            result.section,
            truncate_str(&result.text, 100),
            result.score,
            result.source,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "héllo wörld with ünicode characters";
        let truncated = truncate_str(s, 10);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 13);
    }

    #[test]
    fn short_strings_pass_through() {
        assert_eq!(truncate_str("short", 10), "short");
    }
}
