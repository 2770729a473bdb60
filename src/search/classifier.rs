//! Query intent classification
//!
//! An ordered rule table evaluated top to bottom; the first matching rule
//! wins and unmatched queries fall through to `Category::General`. Order is
//! load-bearing because categories overlap lexically: "dean" must be caught
//! before the broader leadership rule (which also matches director and
//! president), and "graduate outcomes" must be caught before the programs
//! rule (which matches the bare word "graduate"). Precedence lives in this
//! one table so it can be inspected and tested directly.

use crate::models::Category;

/// One classification rule: the query matches when it contains any of the
/// listed phrases (case-insensitive substring match)
#[derive(Debug, Clone, Copy)]
pub struct ClassifierRule {
    pub name: &'static str,
    pub phrases: &'static [&'static str],
    pub category: Category,
}

impl ClassifierRule {
    #[must_use]
    pub fn matches(&self, query_lc: &str) -> bool {
        self.phrases.iter().any(|p| query_lc.contains(p))
    }
}

/// The rule table, highest precedence first
pub const RULES: &[ClassifierRule] = &[
    ClassifierRule {
        name: "hymn",
        phrases: &["hymn", "anthem", "school song", "university song"],
        category: Category::Hymn,
    },
    // Before leadership: dean queries also contain leadership vocabulary
    ClassifierRule {
        name: "deans",
        phrases: &["dean"],
        category: Category::Deans,
    },
    // Before programs: "graduate outcomes" would otherwise match "graduate"
    ClassifierRule {
        name: "values",
        phrases: &[
            "graduate outcomes",
            "graduate attributes",
            "core values",
            "outcomes",
        ],
        category: Category::Values,
    },
    // Before vision-mission: "admission" contains the substring "mission"
    ClassifierRule {
        name: "admission",
        phrases: &[
            "admission",
            "requirements",
            "enroll",
            "entrance exam",
            "how to apply",
            "application",
        ],
        category: Category::Admission,
    },
    ClassifierRule {
        name: "vision-mission",
        phrases: &["vision", "mission", "goals and objectives"],
        category: Category::VisionMission,
    },
    // Before programs/faculties: broad identity queries mention both
    ClassifierRule {
        name: "comprehensive",
        phrases: &[
            "tell me about",
            "tell me everything",
            "everything about",
            "all about",
            "overview",
            "comprehensive",
            "what is the university",
        ],
        category: Category::Comprehensive,
    },
    ClassifierRule {
        name: "history",
        phrases: &["history", "founded", "founding", "timeline", "milestone", "established"],
        category: Category::History,
    },
    ClassifierRule {
        name: "leadership",
        phrases: &[
            "president",
            "chancellor",
            "director",
            "leadership",
            "administrator",
            "board of regents",
            "vice president",
        ],
        category: Category::Leadership,
    },
    ClassifierRule {
        name: "office",
        phrases: &["office", "registrar", "department head", "student services"],
        category: Category::Office,
    },
    ClassifierRule {
        name: "scholarship",
        phrases: &["scholarship", "financial aid", "grant", "stipend"],
        category: Category::Scholarship,
    },
    ClassifierRule {
        name: "student-org",
        phrases: &[
            "student organization",
            "student org",
            "student council",
            "club",
            "society",
        ],
        category: Category::StudentOrg,
    },
    ClassifierRule {
        name: "schedule",
        phrases: &[
            "schedule",
            "calendar",
            "event",
            "when is",
            "when does",
            "exam week",
            "semester dates",
        ],
        category: Category::Schedule,
    },
    ClassifierRule {
        name: "faculties",
        phrases: &[
            "faculty",
            "faculties",
            "college of",
            "facet",
            "fbm",
            "fnahs",
            "fted",
            "fcje",
        ],
        category: Category::Faculties,
    },
    ClassifierRule {
        name: "programs",
        phrases: &[
            "program",
            "course",
            "degree",
            "bachelor",
            "graduate",
            "curriculum",
            "major",
        ],
        category: Category::Programs,
    },
];

/// Map a query to exactly one category; deterministic, no side effects
#[must_use]
pub fn classify(query: &str) -> Category {
    let query_lc = query.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.matches(&query_lc))
        .map_or(Category::General, |rule| rule.category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dean_queries_win_over_leadership() {
        // "dean" appears before the leadership rule even though dean queries
        // carry leadership-adjacent vocabulary
        assert_eq!(classify("Who is the dean of FACET?"), Category::Deans);
    }

    #[test]
    fn graduate_outcomes_win_over_programs() {
        assert_eq!(classify("What are the graduate outcomes?"), Category::Values);
    }

    #[test]
    fn plain_graduate_queries_are_programs() {
        assert_eq!(classify("graduate degree offerings"), Category::Programs);
    }

    #[test]
    fn president_queries_are_leadership() {
        assert_eq!(classify("Who is the university president?"), Category::Leadership);
    }

    #[test]
    fn unmatched_queries_fall_through_to_general() {
        assert_eq!(classify("parking space availability"), Category::General);
    }

    #[test]
    fn classification_is_deterministic() {
        let query = "When is the enrollment schedule for FACET?";
        assert_eq!(classify(query), classify(query));
    }

    #[test]
    fn comprehensive_wins_over_programs_and_faculties() {
        // Precedence preserved from the original rule chain: broad identity
        // queries mention programs and faculties but are not scoped to either
        assert_eq!(
            classify("Tell me about the university and its programs"),
            Category::Comprehensive
        );
    }

    #[test]
    fn every_rule_is_reachable() {
        // Each rule's first phrase alone must select that rule's category,
        // proving no earlier rule shadows it completely
        for rule in RULES {
            assert_eq!(
                classify(rule.phrases[0]),
                rule.category,
                "rule {} is shadowed",
                rule.name
            );
        }
    }

    #[test]
    fn admission_wins_over_vision_mission() {
        // "admission" contains the substring "mission"
        assert_eq!(classify("admission requirements for freshmen"), Category::Admission);
        assert_eq!(classify("what is the university mission"), Category::VisionMission);
    }

    #[test]
    fn hymn_queries_classify_as_hymn() {
        assert_eq!(classify("sing the university hymn"), Category::Hymn);
    }

    #[test]
    fn schedule_queries_classify_as_schedule() {
        assert_eq!(classify("when is the final exam week"), Category::Schedule);
    }
}
