mod common;

use common::{FALLBACK, HRT, document, interaction_rule, mock_index, mock_rules};
use mht_core::models::interaction::{InteractionSeverity, MatchType};
use mht_interactions::resolver::MedicationQuery;
use mht_interactions::rules::InteractionIndex;

#[test]
fn exact_example_under_primary() {
    let result = mock_index().find_best_rule(HRT, "coumadin", None).unwrap();
    assert_eq!(result.match_type, MatchType::Exact);
    assert_eq!(result.severity, InteractionSeverity::High);
    assert_eq!(result.severity_label, "Critical");
    assert_eq!(result.score, 4.0);
    assert_eq!(result.primary, HRT);
    assert_eq!(result.medication, "coumadin");
    assert_eq!(result.source, "Rules (local)");
}

#[test]
fn generic_fallback_for_unknown_primary() {
    let result = mock_index()
        .find_best_rule("Unknown Primary", "st john's wort", None)
        .unwrap();
    assert_eq!(result.match_type, MatchType::Fallback);
    assert_eq!(result.primary, FALLBACK);
    assert_eq!(result.severity, InteractionSeverity::Major);
}

#[test]
fn matching_ignores_case_and_spacing() {
    let result = mock_index()
        .find_best_rule("  hormone replacement   therapy (hrt) ", "  WARFARIN ", None)
        .unwrap();
    assert_eq!(result.match_type, MatchType::Exact);
    assert_eq!(result.medication, "  WARFARIN ");
    assert_eq!(result.primary, HRT);
}

#[test]
fn partial_name_matches_as_category() {
    let index = mock_index();

    let longer = index.find_best_rule(HRT, "warfarin sodium", None).unwrap();
    assert_eq!(longer.match_type, MatchType::Category);
    assert_eq!(longer.severity, InteractionSeverity::High);

    let shorter = index.find_best_rule(HRT, "naprox", None).unwrap();
    assert_eq!(shorter.match_type, MatchType::Category);
    assert_eq!(shorter.severity, InteractionSeverity::Major);
}

#[test]
fn category_hint_matches_interaction_with() {
    let index = mock_index();
    let result = index
        .find_best_rule(HRT, "mystery drug", Some("NSAIDs"))
        .unwrap();
    assert_eq!(result.match_type, MatchType::Category);
    assert_eq!(result.rationale, format!("{HRT} with NSAIDs"));

    let broader = index
        .find_best_rule(HRT, "mystery drug", Some("oral anticoagulants"))
        .unwrap();
    assert_eq!(broader.severity, InteractionSeverity::High);
}

#[test]
fn category_stage_needs_a_hint() {
    let index = mock_index();
    assert!(index.find_best_rule(HRT, "mystery drug", None).is_none());
    assert!(index.find_best_rule(HRT, "mystery drug", Some("")).is_none());
    assert!(index.find_best_rule(HRT, "mystery drug", Some("   ")).is_none());
}

#[test]
fn empty_name_does_not_match_partially() {
    assert!(mock_index().find_best_rule(HRT, "", None).is_none());
}

#[test]
fn fallback_applies_under_known_primary() {
    let result = mock_index().find_best_rule(HRT, "Ginkgo", None).unwrap();
    assert_eq!(result.match_type, MatchType::Fallback);
}

#[test]
fn fallback_requires_exact_example() {
    assert!(
        mock_index()
            .find_best_rule("Unknown Primary", "ginkgo biloba", None)
            .is_none()
    );
}

#[test]
fn exact_match_beats_fallback() {
    let mut rules = mock_rules();
    rules.push(interaction_rule(HRT, "Herbal supplements", &["ginkgo"], "MODERATE", 2.0));
    let index = InteractionIndex::from_json(&document(rules)).unwrap();

    let result = index.find_best_rule(HRT, "ginkgo", None).unwrap();
    assert_eq!(result.match_type, MatchType::Exact);
    assert_eq!(result.severity, InteractionSeverity::Moderate);
}

#[test]
fn earlier_rule_wins_within_stage() {
    let index = InteractionIndex::from_json(&document(vec![
        interaction_rule(HRT, "First", &["aspirin"], "MINOR", 1.0),
        interaction_rule(HRT, "Second", &["aspirin"], "HIGH", 4.0),
    ]))
    .unwrap();
    let result = index.find_best_rule(HRT, "aspirin", None).unwrap();
    assert_eq!(result.severity, InteractionSeverity::Minor);
}

#[test]
fn analyze_sorts_by_score_and_drops_misses() {
    let meds = [
        MedicationQuery::new("ibuprofen"),
        MedicationQuery::new("coumadin"),
        MedicationQuery::new("unlisted"),
        MedicationQuery::new("diclofenac"),
        MedicationQuery::new("something").with_category("anticoagulants"),
    ];
    let results = mock_index().analyze_medications_for_primary(HRT, &meds);
    let names: Vec<_> = results.iter().map(|r| r.medication.as_str()).collect();
    assert_eq!(names, ["coumadin", "something", "ibuprofen", "diclofenac"]);
}

#[test]
fn analyze_with_no_medications_is_empty() {
    assert!(mock_index().analyze_medications_for_primary(HRT, &[]).is_empty());
}

#[test]
fn selection_crosses_primaries_and_medications() {
    let results = mock_index()
        .find_interactions_for_selection(&[HRT, "SSRIs / SNRIs"], &["warfarin", "tums"]);
    let pairs: Vec<_> = results
        .iter()
        .map(|r| (r.primary.as_str(), r.medication.as_str(), r.score))
        .collect();
    assert_eq!(
        pairs,
        [(HRT, "warfarin", 4.0), ("SSRIs / SNRIs", "warfarin", 3.0)]
    );
}

#[test]
fn unknown_medication_reports_misses() {
    let index = mock_index();
    assert!(index.is_unknown_medication(HRT, "paracetamol", None));
    assert!(!index.is_unknown_medication(HRT, "paracetamol", Some("NSAIDs")));
    assert!(!index.is_unknown_medication(HRT, "warfarin", None));
}

#[test]
fn primary_groups_skip_fallbacks() {
    assert_eq!(
        mock_index().available_primary_groups(),
        ["Bisphosphonates", HRT, "SSRIs / SNRIs"]
    );
}

#[test]
fn stats_count_rules_groups_and_examples() {
    let stats = mock_index().stats();
    assert_eq!(stats.total_rules, 5);
    assert_eq!(stats.primary_groups, 4);
    assert_eq!(stats.total_examples, 12);
    assert_eq!(stats.severity_breakdown.get("HIGH"), Some(&1));
    assert_eq!(stats.severity_breakdown.get("MAJOR"), Some(&3));
    assert_eq!(stats.severity_breakdown.get("MINOR"), Some(&1));
    assert_eq!(stats.severity_breakdown.get("LOW"), None);
}

#[test]
fn display_line() {
    let result = mock_index().find_best_rule(HRT, "coumadin", None).unwrap();
    assert_eq!(
        result.display(),
        "coumadin + Hormone Replacement Therapy (HRT) — HIGH (Critical)"
    );
}
