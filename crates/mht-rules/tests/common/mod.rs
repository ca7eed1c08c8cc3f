#![allow(dead_code)]

use std::sync::Arc;

use mht_rules::engine::DecisionEngine;
use mht_rules::store::RuleSet;
use serde_json::{Value, json};

pub const THRESHOLDS: &str = r#"{
    "ASCVD": { "intermediate": 7.5, "high": 20 },
    "Framingham": { "intermediate": 10, "high": 20 },
    "Gail": { "intermediate": 1.67, "high": 3.0 },
    "TyrerCuzick": { "intermediate": 15, "high": 20 },
    "Wells": { "intermediate": 2, "high": 6 },
    "FRAX": { "intermediate": 10, "high": 20 }
}"#;

pub const DRUG_CLASSES: &str = r#"{
    "drugClasses": {
        "anticoagulants": {
            "interactions": { "estrogen_oral": "Raised clotting factors" }
        },
        "thyroid_hormones": {
            "interactions": { "estrogen_oral": "TBG increase" }
        },
        "corticosteroids": {
            "interactions": { "bisphosphonate_therapy": "Fracture risk" }
        }
    }
}"#;

pub fn rule(id: &str, condition: Value, suitability: &str) -> Value {
    json!({
        "id": id,
        "condition": condition,
        "action": {
            "recommendation": format!("{id} recommendation"),
            "suitability": suitability,
            "rationale": format!("{id} rationale"),
        }
    })
}

pub fn tiers(contraindication: Value, high_risk: Value, moderate_risk: Value, default: Value) -> Value {
    json!({
        "contraindication": contraindication,
        "high_risk": high_risk,
        "interaction": [],
        "moderate_risk": moderate_risk,
        "default": default,
    })
}

pub fn rule_set(treatment_rules: Value) -> Arc<RuleSet> {
    Arc::new(
        RuleSet::from_documents(&treatment_rules.to_string(), THRESHOLDS, DRUG_CLASSES)
            .expect("fixture rules load"),
    )
}

pub fn engine(treatment_rules: Value) -> DecisionEngine {
    DecisionEngine::new(rule_set(treatment_rules))
}

pub fn empty_engine() -> DecisionEngine {
    engine(tiers(json!([]), json!([]), json!([]), json!([])))
}
