#![allow(dead_code)]

use mht_interactions::rules::InteractionIndex;
use serde_json::{Value, json};

pub const HRT: &str = "Hormone Replacement Therapy (HRT)";
pub const FALLBACK: &str = "All Primary groups (generic fallback)";

pub fn interaction_rule(
    primary: &str,
    interaction_with: &str,
    examples: &[&str],
    severity: &str,
    score: f64,
) -> Value {
    json!({
        "primary": primary,
        "interaction_with": interaction_with,
        "examples": examples,
        "severity": severity,
        "score": score,
        "rationale": format!("{primary} with {interaction_with}"),
        "recommended_action": format!("Review {interaction_with}"),
        "source": "Rules (local)"
    })
}

pub fn document(rules: Vec<Value>) -> String {
    json!({
        "generatedAt": "2025-01-15T10:00:00Z",
        "version": "test",
        "notes": "fixture",
        "rules": rules
    })
    .to_string()
}

pub fn mock_rules() -> Vec<Value> {
    vec![
        interaction_rule(HRT, "Anticoagulants", &["warfarin", "coumadin", "rivaroxaban"], "HIGH", 4.0),
        interaction_rule(HRT, "NSAIDs", &["ibuprofen", "naproxen", "diclofenac"], "MAJOR", 3.0),
        interaction_rule("SSRIs / SNRIs", "Anticoagulants", &["warfarin", "rivaroxaban"], "MAJOR", 3.0),
        interaction_rule(FALLBACK, "Herbal supplements", &["st john's wort", "ginkgo"], "MAJOR", 3.0),
        interaction_rule("Bisphosphonates", "Calcium / antacids", &["calcium carbonate", "tums"], "MINOR", 1.0),
    ]
}

pub fn mock_index() -> InteractionIndex {
    InteractionIndex::from_json(&document(mock_rules())).expect("fixture rules load")
}
