//! Fact normalization: derives risk categories from numeric scores.

use std::collections::BTreeMap;

use mht_core::models::fact::{FactRecord, lenient_number};
use mht_core::models::risk::{RiskCategory, RiskModel};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LoadError;

/// Cut-offs for one risk model. `moderate` is accepted as a legacy
/// spelling of `intermediate`; any `low` entry is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub high: f64,
    #[serde(alias = "moderate")]
    pub intermediate: f64,
}

/// Thresholds for every [`RiskModel`]. Construction fails unless all models
/// are present, so lookups are infallible afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskThresholds {
    by_model: BTreeMap<RiskModel, Threshold>,
}

impl RiskThresholds {
    pub fn from_document(raw: &BTreeMap<String, Threshold>) -> Result<Self, LoadError> {
        let mut by_model = BTreeMap::new();
        for model in RiskModel::ALL {
            let threshold = raw
                .get(model.key())
                .copied()
                .ok_or(LoadError::MissingThresholds(model))?;
            if !threshold.high.is_finite() || !threshold.intermediate.is_finite() {
                return Err(LoadError::InvalidThresholds {
                    model,
                    reason: "thresholds must be finite numbers".to_string(),
                });
            }
            if threshold.intermediate > threshold.high {
                return Err(LoadError::InvalidThresholds {
                    model,
                    reason: format!(
                        "intermediate ({}) is above high ({})",
                        threshold.intermediate, threshold.high
                    ),
                });
            }
            by_model.insert(model, threshold);
        }
        Ok(Self { by_model })
    }

    pub fn get(&self, model: RiskModel) -> Threshold {
        self.by_model[&model]
    }
}

/// Map a score onto the three-tier scale. A missing score is `low`: an
/// unknown value never escalates risk.
pub fn categorize(value: Option<f64>, threshold: Threshold) -> RiskCategory {
    match value {
        None => RiskCategory::Low,
        Some(v) if v >= threshold.high => RiskCategory::High,
        Some(v) if v >= threshold.intermediate => RiskCategory::Intermediate,
        Some(_) => RiskCategory::Low,
    }
}

/// Derive `<Model>_category` for every risk model. All other fields are
/// carried through verbatim.
pub fn normalize(mut fact: FactRecord, thresholds: &RiskThresholds) -> FactRecord {
    let categories = RiskModel::ALL
        .into_iter()
        .map(|model| {
            let category = categorize(fact.risk_score(model), thresholds.get(model));
            (model, category)
        })
        .collect();
    fact.categories = Some(categories);
    fact
}

/// Build a fact record from the app's assessment payload, which uses
/// camelCase keys with snake_case fallbacks.
pub fn from_assessment(payload: &Value) -> FactRecord {
    let number = |keys: &[&str]| keys.iter().find_map(|key| lenient_number(payload.get(*key)?));
    let text = |keys: &[&str]| {
        keys.iter()
            .find_map(|key| payload.get(*key)?.as_str().map(str::to_string))
    };
    let flag = |keys: &[&str]| {
        keys.iter()
            .find_map(|key| payload.get(*key)?.as_bool())
            .unwrap_or(false)
    };

    let meds = ["currentMedications", "meds"]
        .iter()
        .find_map(|key| payload.get(*key)?.as_array())
        .map(|list| {
            list.iter()
                .filter_map(|med| med.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    let mut fact = FactRecord {
        age: number(&["age"]),
        meds,
        therapy_selected: Some(
            text(&["selectedTherapy", "therapy_selected"]).unwrap_or_else(|| "none".to_string()),
        ),
        symptom_severity: Some(number(&["symptomSeverity", "symptom_severity"]).unwrap_or(1.0)),
        framingham_score: number(&["framingham_score", "Framingham_score"]),
        ..FactRecord::default()
    };

    let score_keys = [
        (RiskModel::Ascvd, "ascvdScore"),
        (RiskModel::Framingham, "framinghamScore"),
        (RiskModel::Gail, "gailScore"),
        (RiskModel::TyrerCuzick, "tyrerCuzickScore"),
        (RiskModel::Wells, "wellsScore"),
        (RiskModel::Frax, "fraxScore"),
    ];
    for (model, camel) in score_keys {
        fact.set_raw_score(model, number(&[camel, model.key()]));
    }

    fact.extra.insert(
        "breast_cancer_active".to_string(),
        Value::Bool(flag(&["breastCancerActive", "breast_cancer_active"])),
    );
    fact.extra.insert(
        "wells_recent_event".to_string(),
        Value::Bool(flag(&["wellsRecentEvent", "wells_recent_event"])),
    );
    fact
}
