//! Per-category strategy profiles
//!
//! One profile per classifier category, all executed by the shared
//! [`StrategyEngine`](super::strategy::StrategyEngine). A profile names the
//! structured-stage filters, the category's marker and entity vocabulary,
//! embedding enrichment terms, the coverage rule where enumeration
//! completeness matters, and the final ordering policy.

use super::rank::OrderingPolicy;
use super::strategy::CoverageRule;
use super::strategy::StrategyProfile;
use crate::models::Category;
use crate::store::ChunkFilter;

/// Faculty codes that enumeration answers must cover
pub const FACULTY_CODES: &[&str] = &["FACET", "FBM", "FNAHS", "FTED", "FCJE"];

/// Hymn part labels in render order
pub const HYMN_PARTS: &[&str] = &["verse1", "chorus", "verse2", "finalChorus"];

/// Scholarship types that enumeration answers must cover
pub const SCHOLARSHIP_TYPES: &[&str] = &["academic", "athletic", "need_based"];

/// Build the profile for a category
#[must_use]
pub fn profile_for(category: Category) -> StrategyProfile {
    match category {
        Category::General => StrategyProfile {
            category,
            filters: vec![ChunkFilter::default().with_keywords(&[
                "university",
                "campus",
                "student",
            ])],
            markers: &["university", "campus"],
            entities: &[],
            enrich: &[],
            coverage: None,
            ordering: OrderingPolicy::Score,
            schedule_source: false,
        },
        Category::Comprehensive => StrategyProfile {
            category,
            filters: vec![
                ChunkFilter::for_section("university_identity"),
                ChunkFilter::for_section("history"),
                ChunkFilter::for_section("programs"),
                ChunkFilter::for_section("faculties"),
            ],
            markers: &["university", "identity", "overview", "profile"],
            entities: &[],
            enrich: &["university overview identity programs faculties"],
            coverage: None,
            ordering: OrderingPolicy::Score,
            schedule_source: false,
        },
        Category::History => StrategyProfile {
            category,
            filters: vec![ChunkFilter::for_section("history")],
            markers: &["history", "founded", "milestone", "timeline"],
            entities: &[],
            enrich: &["history founding milestones"],
            coverage: None,
            // Timeline entries read oldest to newest
            ordering: OrderingPolicy::ChronologicalAsc,
            schedule_source: false,
        },
        Category::Leadership => StrategyProfile {
            category,
            filters: vec![ChunkFilter::for_section("leadership")],
            markers: &["president", "chancellor", "director", "leadership"],
            entities: &[],
            enrich: &["university leadership officials"],
            coverage: None,
            ordering: OrderingPolicy::Score,
            schedule_source: false,
        },
        Category::Deans => StrategyProfile {
            category,
            filters: vec![ChunkFilter::for_section("deans")],
            markers: &["dean", "faculty", "college"],
            entities: FACULTY_CODES,
            enrich: &["faculty deans"],
            // Listing deans must represent every faculty
            coverage: Some(CoverageRule {
                key: "faculty",
                required: FACULTY_CODES,
            }),
            ordering: OrderingPolicy::Score,
            schedule_source: false,
        },
        Category::Office => StrategyProfile {
            category,
            filters: vec![ChunkFilter::for_section("offices")],
            markers: &["office", "registrar", "services"],
            entities: &[],
            enrich: &["administrative offices services"],
            coverage: None,
            ordering: OrderingPolicy::Score,
            schedule_source: false,
        },
        Category::Programs => StrategyProfile {
            category,
            filters: vec![ChunkFilter::for_section("programs")],
            markers: &["program", "degree", "bachelor", "curriculum"],
            entities: FACULTY_CODES,
            enrich: &["academic programs degrees"],
            // Program listings must represent every faculty
            coverage: Some(CoverageRule {
                key: "faculty",
                required: FACULTY_CODES,
            }),
            ordering: OrderingPolicy::Score,
            schedule_source: false,
        },
        Category::Faculties => StrategyProfile {
            category,
            filters: vec![ChunkFilter::for_section("faculties")],
            markers: &["faculty", "college", "department"],
            entities: FACULTY_CODES,
            enrich: &["faculties colleges departments"],
            coverage: Some(CoverageRule {
                key: "faculty",
                required: FACULTY_CODES,
            }),
            ordering: OrderingPolicy::Score,
            schedule_source: false,
        },
        Category::StudentOrg => StrategyProfile {
            category,
            filters: vec![ChunkFilter::for_section("student_orgs")],
            markers: &["organization", "club", "society", "council"],
            entities: &[],
            enrich: &["student organizations clubs"],
            coverage: None,
            ordering: OrderingPolicy::Score,
            schedule_source: false,
        },
        Category::Admission => StrategyProfile {
            category,
            filters: vec![ChunkFilter::for_section("admission")],
            markers: &["admission", "requirements", "enrollment", "apply"],
            entities: &[],
            enrich: &["admission requirements enrollment"],
            coverage: None,
            ordering: OrderingPolicy::Score,
            schedule_source: false,
        },
        Category::Hymn => StrategyProfile {
            category,
            filters: vec![ChunkFilter::for_section("hymn")],
            markers: &["hymn", "anthem", "verse", "chorus"],
            entities: &[],
            enrich: &["university hymn lyrics"],
            // Every part must be present so the lyrics render complete
            coverage: Some(CoverageRule {
                key: "part",
                required: HYMN_PARTS,
            }),
            // Verses render in sequence regardless of score
            ordering: OrderingPolicy::Structural(HYMN_PARTS),
            schedule_source: false,
        },
        Category::VisionMission => StrategyProfile {
            category,
            filters: vec![ChunkFilter::for_section("vision_mission")],
            markers: &["vision", "mission", "goals"],
            entities: &[],
            enrich: &["vision mission statement"],
            coverage: None,
            ordering: OrderingPolicy::Score,
            schedule_source: false,
        },
        Category::Values => StrategyProfile {
            category,
            filters: vec![ChunkFilter::for_section("values_outcomes")],
            markers: &["values", "outcomes", "attributes"],
            entities: &[],
            enrich: &["core values graduate outcomes"],
            coverage: None,
            ordering: OrderingPolicy::Score,
            schedule_source: false,
        },
        Category::Schedule => StrategyProfile {
            category,
            filters: Vec::new(),
            markers: &["schedule", "calendar", "event"],
            entities: &[],
            enrich: &["academic calendar events"],
            coverage: None,
            // Soonest events first
            ordering: OrderingPolicy::ChronologicalAsc,
            schedule_source: true,
        },
        Category::Scholarship => StrategyProfile {
            category,
            filters: vec![ChunkFilter::for_section("scholarships")],
            markers: &["scholarship", "grant", "financial"],
            entities: &[],
            enrich: &["scholarships financial aid grants"],
            coverage: Some(CoverageRule {
                key: "scholarship_type",
                required: SCHOLARSHIP_TYPES,
            }),
            ordering: OrderingPolicy::Score,
            schedule_source: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_category_has_a_profile() {
        for category in Category::ALL {
            let profile = profile_for(category);
            assert_eq!(profile.category, category);
        }
    }

    #[test]
    fn enumeration_categories_carry_coverage_rules() {
        assert!(profile_for(Category::Deans).coverage.is_some());
        assert!(profile_for(Category::Programs).coverage.is_some());
        assert!(profile_for(Category::Hymn).coverage.is_some());
        assert!(profile_for(Category::Scholarship).coverage.is_some());
    }

    #[test]
    fn hymn_profile_orders_structurally() {
        let profile = profile_for(Category::Hymn);
        assert_eq!(profile.ordering, OrderingPolicy::Structural(HYMN_PARTS));
    }

    #[test]
    fn schedule_profile_routes_to_the_schedule_store() {
        assert!(profile_for(Category::Schedule).schedule_source);
        assert!(!profile_for(Category::General).schedule_source);
    }
}
