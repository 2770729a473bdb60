//! Query typo correction against a known vocabulary
//!
//! Normalizes a raw query by replacing likely misspellings with the nearest
//! vocabulary word by edit distance. Correction is conservative: short words
//! are left alone, exact vocabulary hits short-circuit, and ties resolve to
//! the lexicographically smallest candidate so repeated calls always produce
//! the same output.

use std::collections::HashSet;

/// Words shorter than this are never corrected
const MIN_CORRECTABLE_LEN: usize = 4;

/// Vocabulary-backed typo corrector
#[derive(Debug, Clone, Default)]
pub struct TypoCorrector {
    /// Sorted, deduplicated vocabulary; iteration order fixes tie-breaks
    words: Vec<String>,
    exact: HashSet<String>,
}

impl TypoCorrector {
    /// Build a corrector from any word source; input casing is ignored
    pub fn with_vocabulary<I, S>(vocabulary: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words: Vec<String> = vocabulary
            .into_iter()
            .map(|w| w.as_ref().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        words.sort();
        words.dedup();
        let exact = words.iter().cloned().collect();
        Self { words, exact }
    }

    /// Extend the vocabulary in place, e.g. with store keywords
    pub fn extend<I, S>(&mut self, vocabulary: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.words
            .extend(vocabulary.into_iter().map(|w| w.as_ref().to_lowercase()));
        self.words.sort();
        self.words.dedup();
        self.exact = self.words.iter().cloned().collect();
    }

    /// Correct a query string
    ///
    /// Returns the corrected text plus a flag indicating whether any word was
    /// replaced. Tokens keep their position; punctuation-only tokens pass
    /// through untouched.
    #[must_use]
    pub fn correct(&self, text: &str) -> (String, bool) {
        let mut had_corrections = false;
        let corrected: Vec<String> = text
            .split_whitespace()
            .map(|token| {
                let core: String = token
                    .chars()
                    .filter(|c| c.is_alphanumeric())
                    .collect::<String>()
                    .to_lowercase();
                match self.correct_word(&core) {
                    Some(replacement) if replacement != core => {
                        had_corrections = true;
                        replacement
                    }
                    _ => token.to_string(),
                }
            })
            .collect();

        (corrected.join(" "), had_corrections)
    }

    /// Find the closest vocabulary word within the allowed edit distance
    ///
    /// Distance budget is 1 for five-letter words and below, 2 above that.
    fn correct_word(&self, word: &str) -> Option<String> {
        if word.len() < MIN_CORRECTABLE_LEN {
            return None;
        }
        if self.exact.contains(word) {
            return Some(word.to_string());
        }

        let max_distance = if word.len() <= 5 { 1 } else { 2 };
        let mut best: Option<(usize, &str)> = None;

        for candidate in &self.words {
            let len_diff = candidate.len().abs_diff(word.len());
            if len_diff > max_distance {
                continue;
            }
            let distance = strsim::levenshtein(word, candidate);
            if distance <= max_distance {
                match best {
                    None => best = Some((distance, candidate)),
                    Some((best_distance, _)) if distance < best_distance => {
                        best = Some((distance, candidate));
                    }
                    _ => {}
                }
            }
        }

        best.map(|(_, w)| w.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corrector() -> TypoCorrector {
        TypoCorrector::with_vocabulary(["scholarship", "admission", "dean", "faculty", "hymn"])
    }

    #[test]
    fn corrects_close_misspellings() {
        let (corrected, had) = corrector().correct("scholarhip requirements");
        assert!(had);
        assert!(corrected.starts_with("scholarship"));
    }

    #[test]
    fn exact_words_pass_through_unchanged() {
        let (corrected, had) = corrector().correct("dean of faculty");
        assert_eq!(corrected, "dean of faculty");
        assert!(!had);
    }

    #[test]
    fn short_words_are_never_touched() {
        let (corrected, had) = corrector().correct("who is de den");
        assert_eq!(corrected, "who is de den");
        assert!(!had);
    }

    #[test]
    fn correction_is_deterministic() {
        let c = corrector();
        let first = c.correct("admision for scholarhip");
        let second = c.correct("admision for scholarhip");
        assert_eq!(first, second);
    }

    #[test]
    fn distant_words_are_left_alone() {
        let (corrected, had) = corrector().correct("astrophysics");
        assert_eq!(corrected, "astrophysics");
        assert!(!had);
    }
}
