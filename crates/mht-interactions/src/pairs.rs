//! Pair-style interaction table: a severity per (main drug, optional drug).

use mht_core::models::interaction::PairSeverity;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use ts_rs::TS;

use crate::DocumentSource;
use crate::error::InteractionError;

pub const INTERACTION_PAIRS_FILE: &str = "interaction_pairs.json";

const BUNDLED_INTERACTION_PAIRS: &str = include_str!("../rules/interaction_pairs.json");

/// Name fragments and the canonical keys they add.
const ALIASES: &[(&str, &[&str])] = &[
    ("estrogen", &["hormone_estradiol", "estrogen", "estradiol"]),
    ("estradiol", &["hormone_estradiol", "estrogen", "estradiol"]),
    ("hrt", &["hormone_estradiol", "hormone_progesterone"]),
    ("progesterone", &["hormone_progesterone", "progesterone"]),
    ("testosterone", &["hormone_testosterone", "testosterone"]),
    ("warfarin", &["warfarin"]),
    ("aspirin", &["aspirin"]),
    ("ibuprofen", &["ibuprofen"]),
    ("simvastatin", &["simvastatin"]),
    ("atorvastatin", &["atorvastatin"]),
    ("levothyroxine", &["levothyroxine"]),
    ("metformin", &["metformin"]),
    ("gabapentin", &["gabapentin"]),
    ("pregabalin", &["pregabalin"]),
    ("paroxetine", &["paroxetine"]),
    ("venlafaxine", &["venlafaxine"]),
    ("alendronate", &["alendronate"]),
    ("risedronate", &["risedronate"]),
];

/// `"Estradiol (oral) 1mg"` -> `"estradiol_oral_1mg"`.
pub fn canonical_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len());
    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            key.push(c);
        } else if !key.ends_with('_') {
            key.push('_');
        }
    }
    key.trim_matches('_').to_string()
}

/// The canonical key followed by alias expansions, de-duplicated in order.
pub fn canonical_keys(name: &str) -> Vec<String> {
    let base = name.trim().to_lowercase();
    let mut keys = vec![canonical_key(name)];
    for (pattern, expansions) in ALIASES {
        if !base.contains(pattern) {
            continue;
        }
        for expansion in *expansions {
            if !keys.iter().any(|k| k == expansion) {
                keys.push(expansion.to_string());
            }
        }
    }
    keys
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionalDrug {
    pub drug: String,
    pub severity: PairSeverity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugPair {
    pub main: String,
    pub optionals: Vec<OptionalDrug>,
}

/// Result of checking one optional medicine against the main one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PairCheck {
    pub drug_name: String,
    pub display_name: String,
    pub severity: PairSeverity,
    pub severity_display: String,
}

/// Two selected medicines that the table lists together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PairWarning {
    pub medicine1: String,
    pub medicine2: String,
    pub severity: PairSeverity,
    pub severity_display: String,
    pub clinical_action: String,
}

/// An optional medicine to check, with an optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionalMedicine {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl OptionalMedicine {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PairTable {
    version: String,
    notes: String,
    pairs: Vec<DrugPair>,
    missing_severity: PairSeverity,
}

impl PairTable {
    pub fn from_source(source: &DocumentSource) -> Result<Self, InteractionError> {
        Self::from_json(&source.read(BUNDLED_INTERACTION_PAIRS)?)
    }

    pub fn from_json(json: &str) -> Result<Self, InteractionError> {
        let document: Value = serde_json::from_str(json).map_err(|source| InteractionError::Json {
            document: INTERACTION_PAIRS_FILE,
            source,
        })?;

        let pairs = document
            .get("pairs")
            .filter(|pairs| pairs.is_array())
            .cloned()
            .ok_or(InteractionError::MissingPairs)?;
        let pairs: Vec<RawPair> =
            serde_json::from_value(pairs).map_err(|source| InteractionError::Json {
                document: INTERACTION_PAIRS_FILE,
                source,
            })?;

        let missing_severity = document
            .pointer("/defaults/missingSeverity")
            .and_then(Value::as_str)
            .ok_or(InteractionError::MissingDefaults)?;
        let missing_severity = parse_severity(missing_severity).ok_or_else(|| {
            InteractionError::InvalidPairSeverity {
                main: "defaults".to_string(),
                drug: "missingSeverity".to_string(),
                severity: missing_severity.to_string(),
            }
        })?;

        let pairs = pairs
            .into_iter()
            .map(|pair| pair.compile())
            .collect::<Result<Vec<_>, _>>()?;

        let text = |key: &str| {
            document
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let table = Self {
            version: text("version"),
            notes: text("notes"),
            pairs,
            missing_severity,
        };
        info!(
            pairs = table.pairs.len(),
            version = %table.version,
            missing_severity = table.missing_severity.display(),
            "interaction pairs loaded"
        );
        Ok(table)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn pairs(&self) -> &[DrugPair] {
        &self.pairs
    }

    pub fn missing_severity(&self) -> PairSeverity {
        self.missing_severity
    }

    /// Severity of `optional` taken with `main`: the first pair whose main
    /// key and optional drug key both match, else the table default.
    pub fn severity(&self, main: &str, optional: &str) -> PairSeverity {
        match self.lookup(main, optional) {
            Some(severity) => severity,
            None => {
                debug!(
                    main,
                    optional,
                    severity = self.missing_severity.display(),
                    "no pair, using default"
                );
                self.missing_severity
            }
        }
    }

    /// A listed pair in either direction: `first` as the main medicine, then
    /// `second`. Never falls back to the table default.
    pub fn find_pair(&self, first: &str, second: &str) -> Option<PairSeverity> {
        self.lookup(first, second).or_else(|| self.lookup(second, first))
    }

    /// Every unordered pair of `medicines` that the table lists, in
    /// selection order.
    pub fn pairwise<S: AsRef<str>>(&self, medicines: &[S]) -> Vec<PairWarning> {
        let mut warnings = Vec::new();
        for (i, first) in medicines.iter().enumerate() {
            for second in &medicines[i + 1..] {
                let (first, second) = (first.as_ref(), second.as_ref());
                if let Some(severity) = self.find_pair(first, second) {
                    warnings.push(PairWarning {
                        medicine1: first.to_string(),
                        medicine2: second.to_string(),
                        severity,
                        severity_display: severity.display().to_string(),
                        clinical_action: clinical_action(severity).to_string(),
                    });
                }
            }
        }
        warnings
    }

    fn lookup(&self, main: &str, optional: &str) -> Option<PairSeverity> {
        let main_keys = canonical_keys(main);
        let optional_keys = canonical_keys(optional);

        let (pair, hit) = self
            .pairs
            .iter()
            .filter(|pair| main_keys.contains(&pair.main))
            .find_map(|pair| {
                pair.optionals
                    .iter()
                    .find(|o| optional_keys.contains(&o.drug))
                    .map(|o| (pair, o))
            })?;
        debug!(
            main = %pair.main,
            optional = %hit.drug,
            severity = hit.severity.display(),
            "pair matched"
        );
        Some(hit.severity)
    }

    pub fn check(&self, main: &str, optionals: &[OptionalMedicine]) -> Vec<PairCheck> {
        if main.is_empty() || optionals.is_empty() {
            return Vec::new();
        }
        optionals
            .iter()
            .map(|optional| {
                let severity = self.severity(main, &optional.name);
                PairCheck {
                    drug_name: optional.name.clone(),
                    display_name: optional
                        .display_name
                        .clone()
                        .unwrap_or_else(|| optional.name.clone()),
                    severity,
                    severity_display: severity.display().to_string(),
                }
            })
            .collect()
    }
}

/// The strongest of `severities`: high, then moderate, else low.
pub fn highest_severity(severities: &[PairSeverity]) -> PairSeverity {
    if severities.contains(&PairSeverity::High) {
        PairSeverity::High
    } else if severities.contains(&PairSeverity::Moderate) {
        PairSeverity::Moderate
    } else {
        PairSeverity::Low
    }
}

pub fn clinical_action(severity: PairSeverity) -> &'static str {
    match severity {
        PairSeverity::High => "Avoid combination or monitor very closely",
        PairSeverity::Moderate => "Monitor for interactions and adjust if needed",
        PairSeverity::Low => "Monitor routinely",
        PairSeverity::Unknown => "Monitor as clinically appropriate",
    }
}

fn parse_severity(value: &str) -> Option<PairSeverity> {
    match value {
        "high" => Some(PairSeverity::High),
        "moderate" => Some(PairSeverity::Moderate),
        "low" => Some(PairSeverity::Low),
        "unknown" => Some(PairSeverity::Unknown),
        _ => None,
    }
}

#[derive(Deserialize)]
struct RawPair {
    main: String,
    #[serde(default)]
    optionals: Vec<RawOptional>,
}

#[derive(Deserialize)]
struct RawOptional {
    drug: String,
    severity: String,
}

impl RawPair {
    fn compile(self) -> Result<DrugPair, InteractionError> {
        let optionals = self
            .optionals
            .into_iter()
            .map(|optional| match parse_severity(&optional.severity) {
                Some(severity) => Ok(OptionalDrug {
                    drug: optional.drug,
                    severity,
                }),
                None => Err(InteractionError::InvalidPairSeverity {
                    main: self.main.clone(),
                    drug: optional.drug,
                    severity: optional.severity,
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DrugPair {
            main: self.main,
            optionals,
        })
    }
}
