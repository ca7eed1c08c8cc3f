use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Named rule groups, evaluated in the order of [`Tier::ORDER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Tier {
    Contraindication,
    HighRisk,
    Interaction,
    ModerateRisk,
    Default,
}

/// How the evaluator treats a tier's matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierMode {
    /// First match returns immediately; nothing after it runs.
    Veto,
    /// Every match is collected for ranking.
    Accumulate,
    /// Produced by the medication pass rather than by scanning the tier.
    MedicationPass,
}

impl Tier {
    pub const ORDER: [Tier; 5] = [
        Tier::Contraindication,
        Tier::HighRisk,
        Tier::Interaction,
        Tier::ModerateRisk,
        Tier::Default,
    ];

    /// Key of the tier in `treatment_rules.json`.
    pub fn key(self) -> &'static str {
        match self {
            Tier::Contraindication => "contraindication",
            Tier::HighRisk => "high_risk",
            Tier::Interaction => "interaction",
            Tier::ModerateRisk => "moderate_risk",
            Tier::Default => "default",
        }
    }

    pub fn mode(self) -> TierMode {
        match self {
            Tier::Contraindication => TierMode::Veto,
            Tier::Interaction => TierMode::MedicationPass,
            Tier::HighRisk | Tier::ModerateRisk | Tier::Default => TierMode::Accumulate,
        }
    }

    /// Whether matches in this tier add an entry to the decision's warnings.
    pub fn emits_warnings(self) -> bool {
        matches!(self, Tier::HighRisk | Tier::Interaction)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
