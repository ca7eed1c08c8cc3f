use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

/// Recommendation strength attached to every rule action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Suitability {
    Contraindicated,
    #[serde(rename = "Use with caution")]
    UseWithCaution,
    Suitable,
    #[serde(rename = "Suitable (for osteoporosis therapy)")]
    SuitableForOsteoporosis,
}

impl Suitability {
    pub const ALL: [Suitability; 4] = [
        Suitability::Contraindicated,
        Suitability::UseWithCaution,
        Suitability::Suitable,
        Suitability::SuitableForOsteoporosis,
    ];

    /// Ranking weight used when several actions compete for the final
    /// decision. Both `Suitable` labels share the lowest weight.
    pub fn priority(self) -> u8 {
        match self {
            Suitability::Contraindicated => 3,
            Suitability::UseWithCaution => 2,
            Suitability::Suitable | Suitability::SuitableForOsteoporosis => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Suitability::Contraindicated => "Contraindicated",
            Suitability::UseWithCaution => "Use with caution",
            Suitability::Suitable => "Suitable",
            Suitability::SuitableForOsteoporosis => "Suitable (for osteoporosis therapy)",
        }
    }
}

impl fmt::Display for Suitability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Suitability {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Suitability::ALL
            .into_iter()
            .find(|candidate| candidate.label() == s)
            .ok_or_else(|| CoreError::UnknownSuitability(s.to_string()))
    }
}
