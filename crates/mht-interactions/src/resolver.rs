//! Interaction Resolver: maps (primary group, medication) to the most
//! specific applicable rule.
//!
//! Stages run in order and the first hit wins:
//!
//! 1. exact example under the same primary
//! 2. partial example match under the same primary
//! 3. `interaction_with` against the caller's category hint
//! 4. exact example under a generic fallback primary

use mht_core::models::interaction::{MatchResult, MatchType};
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::normalize;
use crate::rules::{InteractionIndex, InteractionRule};

/// One medication to look up, with an optional category hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MedicationQuery {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl MedicationQuery {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Either string contains the other. Empty strings never overlap.
fn overlaps(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty() && (a.contains(b) || b.contains(a))
}

fn to_result(rule: &InteractionRule, medication: &str, match_type: MatchType) -> MatchResult {
    MatchResult {
        medication: medication.to_string(),
        primary: rule.primary.clone(),
        severity: rule.severity,
        severity_label: rule.severity.label().to_string(),
        score: rule.score,
        rationale: rule.rationale.clone(),
        recommended_action: rule.recommended_action.clone(),
        source: rule.source.clone(),
        match_type,
    }
}

impl InteractionIndex {
    pub fn find_best_rule(
        &self,
        primary: &str,
        medication_name: &str,
        medication_category: Option<&str>,
    ) -> Option<MatchResult> {
        let primary_key = normalize(primary);
        let name = normalize(medication_name);
        let hint = medication_category.map(normalize).unwrap_or_default();
        let candidates = self
            .by_primary
            .get(&primary_key)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let found = self
            .by_example
            .get(&(primary_key.clone(), name.clone()))
            .map(|&i| (i, MatchType::Exact))
            .or_else(|| {
                candidates
                    .iter()
                    .find(|&&i| self.keys[i].examples.iter().any(|ex| overlaps(&name, ex)))
                    .map(|&i| (i, MatchType::Category))
            })
            .or_else(|| {
                candidates
                    .iter()
                    .find(|&&i| overlaps(&hint, &self.keys[i].interaction_with))
                    .map(|&i| (i, MatchType::Category))
            })
            .or_else(|| {
                self.fallback_examples
                    .get(&name)
                    .map(|&i| (i, MatchType::Fallback))
            });

        match found {
            Some((i, match_type)) => {
                debug!(
                    primary = %primary_key,
                    medication = %name,
                    rule = i,
                    ?match_type,
                    "interaction rule matched"
                );
                Some(to_result(&self.rules[i], medication_name, match_type))
            }
            None => {
                debug!(primary = %primary_key, medication = %name, "no interaction rule");
                None
            }
        }
    }

    /// Look up every medication against one primary group. Misses are
    /// dropped; results are ordered by score, highest first, keeping input
    /// order among equal scores.
    pub fn analyze_medications_for_primary(
        &self,
        primary: &str,
        medications: &[MedicationQuery],
    ) -> Vec<MatchResult> {
        let mut results: Vec<MatchResult> = medications
            .iter()
            .filter_map(|med| self.find_best_rule(primary, &med.name, med.category.as_deref()))
            .collect();
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results
    }

    /// Every primary group against every medication name, ordered by score.
    pub fn find_interactions_for_selection<P, M>(&self, primaries: &[P], medications: &[M]) -> Vec<MatchResult>
    where
        P: AsRef<str>,
        M: AsRef<str>,
    {
        let mut results: Vec<MatchResult> = primaries
            .iter()
            .flat_map(|primary| {
                medications
                    .iter()
                    .filter_map(move |med| self.find_best_rule(primary.as_ref(), med.as_ref(), None))
            })
            .collect();
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results
    }

    pub fn is_unknown_medication(
        &self,
        primary: &str,
        medication_name: &str,
        medication_category: Option<&str>,
    ) -> bool {
        self.find_best_rule(primary, medication_name, medication_category)
            .is_none()
    }
}
