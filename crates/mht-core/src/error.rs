use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown suitability label: {0}")]
    UnknownSuitability(String),

    #[error("unknown risk model: {0}")]
    UnknownRiskModel(String),

    #[error("unknown risk category: {0}")]
    UnknownRiskCategory(String),

    #[error("unknown interaction severity: {0}")]
    UnknownSeverity(String),
}
