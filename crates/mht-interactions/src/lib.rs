//! mht-interactions
//!
//! Medication interaction lookups. [`rules`] loads the rule-list document
//! into an [`rules::InteractionIndex`] that [`resolver`] queries with the
//! exact / partial / category / fallback cascade; [`pairs`] answers
//! severity questions from the main/optional pair table, and [`selection`]
//! runs those checks across a whole medicine selection.

pub mod error;
pub mod pairs;
pub mod resolver;
pub mod rules;
pub mod selection;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::InteractionError;

/// Where an interaction document comes from.
#[derive(Debug, Clone)]
pub enum DocumentSource {
    /// The copy shipped inside this crate.
    Bundled,
    File(PathBuf),
    /// In-memory JSON.
    Inline(String),
}

impl DocumentSource {
    pub(crate) fn read(&self, bundled: &'static str) -> Result<String, InteractionError> {
        match self {
            DocumentSource::Bundled => Ok(bundled.to_string()),
            DocumentSource::File(path) => read_file(path),
            DocumentSource::Inline(json) => Ok(json.clone()),
        }
    }
}

fn read_file(path: &Path) -> Result<String, InteractionError> {
    debug!(path = %path.display(), "reading interaction document");
    std::fs::read_to_string(path).map_err(|source| InteractionError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Lowercase, trim and collapse internal whitespace runs to one space.
pub fn normalize(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
