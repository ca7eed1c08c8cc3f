use std::path::{Path, PathBuf};

use mht_interactions::DocumentSource;
use mht_interactions::pairs::INTERACTION_PAIRS_FILE;
use mht_interactions::rules::INTERACTION_RULES_FILE;
use mht_rules::store::RuleSource;
use serde::{Deserialize, Serialize};

/// Current config version. Bump this when adding fields or changing shape.
/// Each bump requires a corresponding entry in [`MIGRATIONS`].
pub const CURRENT_VERSION: u32 = 1;

/// The first versioned config format. Files without `config_version` are
/// read as this version.
pub const FIRST_VERSION: u32 = 1;

/// `MIGRATIONS[i]` upgrades a config from `FIRST_VERSION + i` to the next
/// version, in place.
type Migration = fn(&mut serde_json::Map<String, serde_json::Value>);
const MIGRATIONS: &[Migration] = &[];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MhtConfig {
    #[serde(default = "first_version")]
    pub config_version: u32,
    /// Directory holding `treatment_rules.json`, `risk_thresholds.json` and
    /// `drug_interactions.json`. Bundled documents when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction_rules: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction_pairs: Option<PathBuf>,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default)]
    pub log_json: bool,
}

fn first_version() -> u32 {
    FIRST_VERSION
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for MhtConfig {
    fn default() -> Self {
        Self {
            config_version: CURRENT_VERSION,
            rules_dir: None,
            interaction_rules: None,
            interaction_pairs: None,
            log_filter: default_log_filter(),
            log_json: false,
        }
    }
}

impl MhtConfig {
    /// Treatment rule documents, preferring `override_dir` over the
    /// configured directory.
    pub fn rule_source(&self, override_dir: Option<&Path>) -> RuleSource {
        match override_dir.or(self.rules_dir.as_deref()) {
            Some(dir) => RuleSource::Directory(dir.to_path_buf()),
            None => RuleSource::Bundled,
        }
    }

    pub fn interaction_rules_source(&self, override_dir: Option<&Path>) -> DocumentSource {
        self.document_source(
            self.interaction_rules.as_deref(),
            override_dir,
            INTERACTION_RULES_FILE,
        )
    }

    pub fn interaction_pairs_source(&self, override_dir: Option<&Path>) -> DocumentSource {
        self.document_source(
            self.interaction_pairs.as_deref(),
            override_dir,
            INTERACTION_PAIRS_FILE,
        )
    }

    /// An explicit file wins; otherwise the rules directory is used when it
    /// holds a document of the standard name.
    fn document_source(
        &self,
        explicit: Option<&Path>,
        override_dir: Option<&Path>,
        file_name: &str,
    ) -> DocumentSource {
        if let Some(path) = explicit {
            return DocumentSource::File(path.to_path_buf());
        }
        match override_dir.or(self.rules_dir.as_deref()) {
            Some(dir) if dir.join(file_name).is_file() => DocumentSource::File(dir.join(file_name)),
            _ => DocumentSource::Bundled,
        }
    }
}

pub fn config_dir() -> eyre::Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| eyre::eyre!("no config directory found"))?;
    Ok(base.join("com.mht.engine"))
}

pub fn default_config_path() -> eyre::Result<PathBuf> {
    Ok(config_dir()?.join("config.json"))
}

/// A config together with where it came from. Loading happens before
/// logging is set up, so `main` reports it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedConfig {
    pub config: MhtConfig,
    /// Version found on disk before migrating; `None` when no file existed.
    pub on_disk_version: Option<u32>,
}

impl LoadedConfig {
    pub fn was_migrated(&self) -> bool {
        self.on_disk_version.is_some_and(|v| v < CURRENT_VERSION)
    }
}

/// Load the config at `path`, running migrations. A missing file yields
/// the defaults.
pub fn load_config(path: &Path) -> eyre::Result<LoadedConfig> {
    if !path.exists() {
        return Ok(LoadedConfig {
            config: MhtConfig::default(),
            on_disk_version: None,
        });
    }

    let contents = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read config at {}: {e}", path.display()))?;

    // Parse as raw JSON so we can run migrations before deserializing.
    let json: serde_json::Value = serde_json::from_str(&contents)?;
    let on_disk_version = match json.get("config_version") {
        None => FIRST_VERSION,
        Some(value) => {
            let raw = value
                .as_u64()
                .ok_or_else(|| eyre::eyre!("config_version must be a non-negative integer"))?;
            u32::try_from(raw).map_err(|_| eyre::eyre!("config_version {raw} is out of range"))?
        }
    };

    let migrated = migrate(json, on_disk_version)?;
    let config: MhtConfig = serde_json::from_value(migrated)?;
    Ok(LoadedConfig {
        config,
        on_disk_version: Some(on_disk_version),
    })
}

/// Run sequential migrations from `from_version` up to [`CURRENT_VERSION`].
/// Each migration is a pure transform on the raw JSON object.
pub fn migrate(mut json: serde_json::Value, from_version: u32) -> eyre::Result<serde_json::Value> {
    if from_version > CURRENT_VERSION {
        return Err(eyre::eyre!(
            "config_version {from_version} is newer than this build supports ({CURRENT_VERSION}). \
             Please update mht."
        ));
    }
    if from_version < FIRST_VERSION {
        return Err(eyre::eyre!(
            "config_version {from_version} predates the first config format ({FIRST_VERSION})"
        ));
    }

    let obj = json
        .as_object_mut()
        .ok_or_else(|| eyre::eyre!("config is not a JSON object"))?;
    for version in from_version..CURRENT_VERSION {
        let step = MIGRATIONS
            .get((version - FIRST_VERSION) as usize)
            .ok_or_else(|| eyre::eyre!("no migration from config_version {version}"))?;
        step(obj);
    }
    obj.insert(
        "config_version".to_string(),
        serde_json::Value::Number(CURRENT_VERSION.into()),
    );

    Ok(json)
}

pub fn save_config(path: &Path, config: &MhtConfig) -> eyre::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| eyre::eyre!("config path {} has no parent", path.display()))?;
    std::fs::create_dir_all(dir)?;

    // Always write the current version, regardless of what was loaded.
    let mut stamped = config.clone();
    stamped.config_version = CURRENT_VERSION;
    let json = serde_json::to_string_pretty(&stamped)?;

    // Write to a temp file then rename for atomicity
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json.as_bytes())?;
    std::fs::rename(&tmp_path, path)?;

    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}
