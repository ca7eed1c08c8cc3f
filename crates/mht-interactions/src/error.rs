use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InteractionError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed {document}: {source}")]
    Json {
        document: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid interaction rule #{index} ({primary}): {reason}")]
    InvalidRule {
        index: usize,
        primary: String,
        reason: String,
    },

    #[error("invalid data format: missing pairs array")]
    MissingPairs,

    #[error("invalid data format: missing defaults.missingSeverity")]
    MissingDefaults,

    #[error("invalid severity '{severity}' for {main} + {drug}")]
    InvalidPairSeverity {
        main: String,
        drug: String,
        severity: String,
    },
}
