use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::action::Action;
use super::suitability::Suitability;

pub const NEUTRAL_RECOMMENDATION: &str = "No specific recommendation";
pub const NEUTRAL_RATIONALE: &str = "No rules matched specifically.";

/// The outcome of one evaluation. Built fresh per call; the caller decides
/// what to store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Decision {
    pub primary: String,
    pub suitability: Suitability,
    pub rationale: String,
    /// High-risk rule ids and medication-pass warning ids, in discovery order.
    pub warnings: Vec<String>,
}

impl Decision {
    pub fn from_action(action: &Action, warnings: Vec<String>) -> Self {
        Self {
            primary: action.recommendation.clone(),
            suitability: action.suitability,
            rationale: action.rationale.clone(),
            warnings,
        }
    }

    /// Returned when no tier produced anything.
    pub fn neutral(warnings: Vec<String>) -> Self {
        Self {
            primary: NEUTRAL_RECOMMENDATION.to_string(),
            suitability: Suitability::Suitable,
            rationale: NEUTRAL_RATIONALE.to_string(),
            warnings,
        }
    }

    pub fn is_neutral(&self) -> bool {
        self.primary == NEUTRAL_RECOMMENDATION && self.rationale == NEUTRAL_RATIONALE
    }
}
