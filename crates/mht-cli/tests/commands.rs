use std::sync::Arc;

use mht_cli::commands::{evaluate, groups, interactions, pair, parse_medication, selection};
use mht_interactions::DocumentSource;
use mht_interactions::pairs::PairTable;
use mht_interactions::rules::InteractionIndex;
use mht_rules::engine::DecisionEngine;
use mht_rules::store::{RuleSet, RuleSource};
use serde_json::json;

fn engine() -> DecisionEngine {
    DecisionEngine::new(Arc::new(RuleSet::from_source(&RuleSource::Bundled).unwrap()))
}

fn index() -> InteractionIndex {
    InteractionIndex::from_source(&DocumentSource::Bundled).unwrap()
}

#[test]
fn medication_argument_parsing() {
    let plain = parse_medication("warfarin");
    assert_eq!(plain.name, "warfarin");
    assert_eq!(plain.category, None);

    let hinted = parse_medication("mystery = NSAIDs");
    assert_eq!(hinted.name, "mystery");
    assert_eq!(hinted.category.as_deref(), Some("NSAIDs"));

    let blank = parse_medication("aspirin=");
    assert_eq!(blank.name, "aspirin");
    assert_eq!(blank.category, None);
}

#[test]
fn evaluate_fact_record() {
    let input = json!({ "therapy_selected": "estrogen_oral", "meds": ["anticoagulants"] });
    let output = evaluate(&engine(), &input, false, false).unwrap();
    assert_eq!(output["suitability"], "Contraindicated");
    assert!(
        output["warnings"]
            .as_array()
            .unwrap()
            .contains(&json!("anticoagulant_interaction"))
    );
}

#[test]
fn evaluate_assessment_with_explanation() {
    let input = json!({ "selectedTherapy": "estrogen_transdermal", "symptomSeverity": 2, "age": 52 });
    let output = evaluate(&engine(), &input, true, true).unwrap();
    assert_eq!(output["vetoed"], false);
    assert_eq!(output["decision"]["suitability"], "Suitable");
    assert!(output["matched"].as_array().is_some_and(|m| !m.is_empty()));
}

#[test]
fn evaluate_rejects_input_that_is_not_an_object() {
    assert!(evaluate(&engine(), &json!(["warfarin"]), false, false).is_err());
    assert!(evaluate(&engine(), &json!("estrogen_oral"), false, false).is_err());
}

#[test]
fn evaluate_accepts_form_style_fact() {
    let input = json!({ "age": "55", "therapy_selected": "estrogen_oral", "meds": ["anticoagulants"] });
    let output = evaluate(&engine(), &input, false, false).unwrap();
    assert_eq!(output["suitability"], "Contraindicated");

    let odd_meds = json!({ "therapy_selected": "estrogen_oral", "meds": "warfarin" });
    let output = evaluate(&engine(), &odd_meds, false, false).unwrap();
    assert_ne!(output["suitability"], "Contraindicated");
}

#[test]
fn interactions_report_unknown_medications() {
    let meds = vec![
        "coumadin".to_string(),
        "paracetamol".to_string(),
        "ibuprofen".to_string(),
    ];
    let output = interactions(&index(), "Hormone Replacement Therapy (HRT)", &meds).unwrap();
    let results = output["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["medication"], "coumadin");
    assert_eq!(results[0]["match_type"], "exact");
    assert_eq!(output["unknown"], json!(["paracetamol"]));
    assert_eq!(
        output["display"][0],
        "coumadin + Hormone Replacement Therapy (HRT) — HIGH (Critical)"
    );
}

#[test]
fn pair_reports_highest_severity() {
    let table = PairTable::from_source(&DocumentSource::Bundled).unwrap();
    let optionals = vec!["Warfarin".to_string(), "Levothyroxine".to_string()];
    let output = pair(&table, "Estradiol", &optionals).unwrap();
    assert_eq!(output["checks"].as_array().unwrap().len(), 2);
    assert_eq!(output["checks"][0]["severity"], "high");
    assert_eq!(output["highest"], "high");

    let empty = pair(&table, "Estradiol", &[]).unwrap();
    assert_eq!(empty["highest"], serde_json::Value::Null);
}

#[test]
fn groups_lists_primaries_and_stats() {
    let output = groups(&index()).unwrap();
    let listed = output["groups"].as_array().unwrap();
    assert!(listed.contains(&json!("Hormone Replacement Therapy (HRT)")));
    assert!(!listed.iter().any(|g| g.as_str().is_some_and(|g| g.contains("fallback"))));
    assert_eq!(output["stats"]["total_rules"], 9);
}

#[test]
fn selection_reports_pairs_and_history_alerts() {
    let table = PairTable::from_source(&DocumentSource::Bundled).unwrap();
    let medicines = vec!["Estradiol gel".to_string(), "Warfarin".to_string()];
    let patient = json!({ "personalHistoryDVT": true });

    let output = selection(&table, &medicines, Some(&patient)).unwrap();
    assert_eq!(output["interactions"][0]["medicine1"], "Estradiol gel");
    assert_eq!(output["interactions"][0]["severity"], "high");
    assert_eq!(output["highest"], "high");
    assert_eq!(output["contraindications"][0]["severity"], "ABSOLUTE");
    assert_eq!(output["contraindications"][0]["condition"], "DVT history");

    let no_patient = selection(&table, &medicines, None).unwrap();
    assert_eq!(no_patient["contraindications"], json!([]));
}

#[test]
fn selection_rejects_malformed_patient() {
    let table = PairTable::from_source(&DocumentSource::Bundled).unwrap();
    let medicines = vec!["Estradiol gel".to_string()];
    let patient = json!({ "smoking": "often" });
    assert!(selection(&table, &medicines, Some(&patient)).is_err());
}
