use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

/// Risk models whose numeric scores are thresholded into categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum RiskModel {
    #[serde(rename = "ASCVD")]
    Ascvd,
    Framingham,
    Gail,
    TyrerCuzick,
    Wells,
    #[serde(rename = "FRAX")]
    Frax,
}

impl RiskModel {
    pub const ALL: [RiskModel; 6] = [
        RiskModel::Ascvd,
        RiskModel::Framingham,
        RiskModel::Gail,
        RiskModel::TyrerCuzick,
        RiskModel::Wells,
        RiskModel::Frax,
    ];

    /// Key of the raw score in fact records and of the threshold entry in
    /// `risk_thresholds.json`.
    pub fn key(self) -> &'static str {
        match self {
            RiskModel::Ascvd => "ASCVD",
            RiskModel::Framingham => "Framingham",
            RiskModel::Gail => "Gail",
            RiskModel::TyrerCuzick => "TyrerCuzick",
            RiskModel::Wells => "Wells",
            RiskModel::Frax => "FRAX",
        }
    }

    /// Key of the derived category, e.g. `ASCVD_category`.
    pub fn category_key(self) -> &'static str {
        match self {
            RiskModel::Ascvd => "ASCVD_category",
            RiskModel::Framingham => "Framingham_category",
            RiskModel::Gail => "Gail_category",
            RiskModel::TyrerCuzick => "TyrerCuzick_category",
            RiskModel::Wells => "Wells_category",
            RiskModel::Frax => "FRAX_category",
        }
    }

    pub fn from_category_key(key: &str) -> Option<RiskModel> {
        RiskModel::ALL
            .into_iter()
            .find(|model| model.category_key() == key)
    }
}

impl fmt::Display for RiskModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for RiskModel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RiskModel::ALL
            .into_iter()
            .find(|model| model.key() == s)
            .ok_or_else(|| CoreError::UnknownRiskModel(s.to_string()))
    }
}

/// Three-tier scale every risk score is mapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RiskCategory {
    Low,
    Intermediate,
    High,
}

impl RiskCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskCategory::Low => "low",
            RiskCategory::Intermediate => "intermediate",
            RiskCategory::High => "high",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(RiskCategory::Low),
            "intermediate" => Ok(RiskCategory::Intermediate),
            "high" => Ok(RiskCategory::High),
            other => Err(CoreError::UnknownRiskCategory(other.to_string())),
        }
    }
}
