use std::path::PathBuf;

use mht_core::models::risk::RiskModel;
use thiserror::Error;

/// Everything that can go wrong while loading rule documents. A load either
/// yields a complete rule set or one of these; never a partial set.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed {document}: {source}")]
    Json {
        document: &'static str,
        source: serde_json::Error,
    },

    #[error("missing required tier: {0}")]
    MissingTier(&'static str),

    #[error("rule '{rule_id}' has an invalid condition on '{field}': {reason}")]
    InvalidCondition {
        rule_id: String,
        field: String,
        reason: String,
    },

    #[error("rule '{rule_id}' has an invalid action: {reason}")]
    InvalidAction { rule_id: String, reason: String },

    #[error("duplicate rule id: {0}")]
    DuplicateRuleId(String),

    #[error("missing thresholds for risk model {0}")]
    MissingThresholds(RiskModel),

    #[error("invalid thresholds for risk model {model}: {reason}")]
    InvalidThresholds { model: RiskModel, reason: String },

    #[error("drug class '{class}' is invalid: {reason}")]
    InvalidDrugClass { class: String, reason: String },
}
