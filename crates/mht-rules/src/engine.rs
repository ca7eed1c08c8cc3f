//! Rule Evaluator: runs the tiers in order and ranks what they produce.

use std::cmp::Reverse;
use std::sync::Arc;

use mht_core::models::action::Action;
use mht_core::models::decision::Decision;
use mht_core::models::fact::FactRecord;
use mht_core::models::suitability::Suitability;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ts_rs::TS;

use crate::normalize::normalize;
use crate::store::RuleSet;
use crate::tier::{Tier, TierMode};
use crate::{ClinicalOverride, all_overrides};

/// What produced a matched action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum MatchOrigin {
    /// A rule from the treatment rules document.
    Rule { id: String },
    /// A drug-class entry whose interaction list names the selected therapy.
    DrugClass { med: String, therapy: String },
    /// A hard-coded clinical override.
    Override { id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MatchedEntry {
    pub tier: Tier,
    pub origin: MatchOrigin,
    pub action: Action,
}

/// A decision together with how it was reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Explanation {
    pub decision: Decision,
    /// True when a contraindication rule ended evaluation early.
    pub vetoed: bool,
    /// Every contributing action in discovery order.
    pub matched: Vec<MatchedEntry>,
    /// Index into `matched` of the entry the decision was taken from.
    pub chosen: Option<usize>,
}

impl Explanation {
    pub fn chosen_entry(&self) -> Option<&MatchedEntry> {
        self.matched.get(self.chosen?)
    }
}

/// Indices of `matched` from strongest to weakest suitability. The sort is
/// stable: equal priorities keep discovery order, so earlier tiers and
/// earlier rules win ties.
pub fn rank(matched: &[MatchedEntry]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..matched.len()).collect();
    order.sort_by_key(|&i| Reverse(matched[i].action.suitability.priority()));
    order
}

pub struct DecisionEngine {
    rules: Arc<RuleSet>,
    overrides: Vec<Box<dyn ClinicalOverride>>,
}

impl DecisionEngine {
    pub fn new(rules: Arc<RuleSet>) -> Self {
        Self::with_overrides(rules, all_overrides())
    }

    pub fn with_overrides(rules: Arc<RuleSet>, overrides: Vec<Box<dyn ClinicalOverride>>) -> Self {
        Self { rules, overrides }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Evaluate one fact record. Total: unknown therapies or medications
    /// simply fail to match.
    pub fn evaluate(&self, fact: &FactRecord) -> Decision {
        self.explain(fact).decision
    }

    pub fn explain(&self, fact: &FactRecord) -> Explanation {
        // Categories are always re-derived from the raw scores.
        let fact = normalize(fact.clone(), self.rules.thresholds());

        let mut matched = Vec::new();
        let mut warnings = Vec::new();

        for tier in Tier::ORDER {
            match tier.mode() {
                TierMode::Veto => {
                    if let Some(vetoed) = self.veto(tier, &fact) {
                        return vetoed;
                    }
                }
                TierMode::Accumulate => self.collect_tier(tier, &fact, &mut matched, &mut warnings),
                TierMode::MedicationPass => self.medication_pass(&fact, &mut matched, &mut warnings),
            }
        }

        let chosen = rank(&matched).first().copied();
        let decision = match chosen {
            Some(index) => Decision::from_action(&matched[index].action, warnings),
            None => Decision::neutral(warnings),
        };

        info!(
            suitability = %decision.suitability,
            matched = matched.len(),
            warnings = decision.warnings.len(),
            "evaluation complete"
        );

        Explanation {
            decision,
            vetoed: false,
            matched,
            chosen,
        }
    }

    /// The first matching rule of a veto tier decides alone, with no warnings.
    fn veto(&self, tier: Tier, fact: &FactRecord) -> Option<Explanation> {
        let rule = self
            .rules
            .tier(tier)
            .iter()
            .find(|rule| rule.condition.matches(fact))?;
        info!(tier = %tier, rule = %rule.id, "veto");
        Some(Explanation {
            decision: Decision::from_action(&rule.action, Vec::new()),
            vetoed: true,
            matched: vec![MatchedEntry {
                tier,
                origin: MatchOrigin::Rule {
                    id: rule.id.clone(),
                },
                action: rule.action.clone(),
            }],
            chosen: Some(0),
        })
    }

    fn collect_tier(
        &self,
        tier: Tier,
        fact: &FactRecord,
        matched: &mut Vec<MatchedEntry>,
        warnings: &mut Vec<String>,
    ) {
        for rule in self.rules.tier(tier) {
            if !rule.condition.matches(fact) {
                continue;
            }
            debug!(tier = %tier, rule = %rule.id, "rule matched");
            if tier.emits_warnings() {
                warnings.push(rule.id.clone());
            }
            matched.push(MatchedEntry {
                tier,
                origin: MatchOrigin::Rule {
                    id: rule.id.clone(),
                },
                action: rule.action.clone(),
            });
        }
    }

    fn medication_pass(
        &self,
        fact: &FactRecord,
        matched: &mut Vec<MatchedEntry>,
        warnings: &mut Vec<String>,
    ) {
        let Some(therapy) = fact.therapy_selected.as_deref() else {
            return;
        };

        for med in &fact.meds {
            if let Some(class) = self.rules.drug_class(med) {
                for interaction in class.interactions.iter().filter(|i| i.applies_to(therapy)) {
                    debug!(med = %med, therapy = %interaction.therapy, "drug class interaction");
                    warnings.push(format!("interaction_{med}_{}", interaction.therapy));
                    matched.push(MatchedEntry {
                        tier: Tier::Interaction,
                        origin: MatchOrigin::DrugClass {
                            med: med.clone(),
                            therapy: interaction.therapy.clone(),
                        },
                        action: Action {
                            recommendation: format!("Interaction: {}", interaction.description),
                            suitability: Suitability::UseWithCaution,
                            rationale: format!(
                                "Medication interaction detected: {med} -> {}",
                                interaction.description
                            ),
                        },
                    });
                }
            }

            for clinical in self.overrides.iter().filter(|o| o.applies(med, therapy)) {
                debug!(med = %med, id = clinical.id(), "clinical override");
                warnings.push(clinical.id().to_string());
                matched.push(MatchedEntry {
                    tier: Tier::Interaction,
                    origin: MatchOrigin::Override {
                        id: clinical.id().to_string(),
                    },
                    action: clinical.action(),
                });
            }
        }
    }
}
