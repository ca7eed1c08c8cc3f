use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::suitability::Suitability;

/// What a matching rule recommends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Action {
    pub recommendation: String,
    pub suitability: Suitability,
    pub rationale: String,
}

impl Action {
    pub fn new(
        recommendation: impl Into<String>,
        suitability: Suitability,
        rationale: impl Into<String>,
    ) -> Self {
        Self {
            recommendation: recommendation.into(),
            suitability,
            rationale: rationale.into(),
        }
    }
}
