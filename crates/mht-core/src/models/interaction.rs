use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

/// Classification of a medication-pair interaction. Distinct from
/// [`Suitability`](super::suitability::Suitability).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum InteractionSeverity {
    High,
    Major,
    Moderate,
    Minor,
    Low,
}

impl InteractionSeverity {
    pub const ALL: [InteractionSeverity; 5] = [
        InteractionSeverity::High,
        InteractionSeverity::Major,
        InteractionSeverity::Moderate,
        InteractionSeverity::Minor,
        InteractionSeverity::Low,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InteractionSeverity::High => "HIGH",
            InteractionSeverity::Major => "MAJOR",
            InteractionSeverity::Moderate => "MODERATE",
            InteractionSeverity::Minor => "MINOR",
            InteractionSeverity::Low => "LOW",
        }
    }

    /// Clinician-facing label.
    pub fn label(self) -> &'static str {
        match self {
            InteractionSeverity::High => "Critical",
            InteractionSeverity::Major => "Major",
            InteractionSeverity::Moderate => "Moderate",
            InteractionSeverity::Minor => "Minor",
            InteractionSeverity::Low => "Low",
        }
    }
}

impl fmt::Display for InteractionSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionSeverity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        InteractionSeverity::ALL
            .into_iter()
            .find(|severity| severity.as_str() == upper)
            .ok_or_else(|| CoreError::UnknownSeverity(s.to_string()))
    }
}

/// Which resolver stage produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum MatchType {
    Exact,
    Category,
    Fallback,
}

impl MatchType {
    /// Higher is more specific.
    pub fn specificity(self) -> u8 {
        match self {
            MatchType::Exact => 3,
            MatchType::Category => 2,
            MatchType::Fallback => 1,
        }
    }
}

/// Output of an interaction lookup for one (primary group, medication) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MatchResult {
    /// The medication name as the caller supplied it.
    pub medication: String,
    pub primary: String,
    pub severity: InteractionSeverity,
    pub severity_label: String,
    pub score: f64,
    pub rationale: String,
    pub recommended_action: String,
    pub source: String,
    pub match_type: MatchType,
}

impl MatchResult {
    pub fn display(&self) -> String {
        format!(
            "{} + {} — {} ({})",
            self.medication, self.primary, self.severity, self.severity_label
        )
    }
}

/// Severity scale used by the pair-style interaction table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PairSeverity {
    High,
    Moderate,
    Low,
    Unknown,
}

impl PairSeverity {
    pub fn display(self) -> &'static str {
        match self {
            PairSeverity::High => "High",
            PairSeverity::Moderate => "Moderate",
            PairSeverity::Low => "Low",
            PairSeverity::Unknown => "Unknown",
        }
    }

    pub fn rank(self) -> u8 {
        match self {
            PairSeverity::High => 3,
            PairSeverity::Moderate => 2,
            PairSeverity::Low => 1,
            PairSeverity::Unknown => 0,
        }
    }
}
