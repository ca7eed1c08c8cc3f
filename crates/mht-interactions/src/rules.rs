//! Rule-list interaction document and its lookup index.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, OnceLock};

use jiff::Timestamp;
use mht_core::error::CoreError;
use mht_core::models::interaction::InteractionSeverity;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ts_rs::TS;

use crate::error::InteractionError;
use crate::{DocumentSource, normalize};

pub const INTERACTION_RULES_FILE: &str = "interaction_rules.json";

const BUNDLED_INTERACTION_RULES: &str = include_str!("../rules/interaction_rules.json");

/// Substrings that mark a primary group as applying to every primary.
const FALLBACK_MARKERS: [&str; 2] = ["all primary groups", "general"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InteractionRule {
    pub primary: String,
    pub interaction_with: String,
    pub examples: Vec<String>,
    pub severity: InteractionSeverity,
    pub score: f64,
    pub rationale: String,
    pub recommended_action: String,
    pub source: String,
}

#[derive(Deserialize)]
struct RawDocument {
    #[serde(rename = "generatedAt", default)]
    generated_at: Option<Timestamp>,
    #[serde(default)]
    version: String,
    #[serde(default)]
    notes: String,
    rules: Vec<RawRule>,
}

#[derive(Deserialize)]
struct RawRule {
    primary: String,
    interaction_with: String,
    #[serde(default)]
    examples: Vec<String>,
    severity: String,
    score: f64,
    #[serde(default)]
    rationale: String,
    #[serde(default)]
    recommended_action: String,
    #[serde(default)]
    source: String,
}

/// Normalized forms of one rule's match keys, kept alongside the rule.
#[derive(Debug, Clone)]
pub(crate) struct RuleKeys {
    pub primary: String,
    pub interaction_with: String,
    pub examples: Vec<String>,
}

/// Document metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentInfo {
    pub generated_at: Option<Timestamp>,
    pub version: String,
    pub notes: String,
}

/// Counts over the loaded rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InteractionStats {
    pub total_rules: usize,
    pub primary_groups: usize,
    pub total_examples: usize,
    pub severity_breakdown: BTreeMap<String, usize>,
}

/// Immutable, indexed interaction rules.
#[derive(Debug)]
pub struct InteractionIndex {
    pub(crate) info: DocumentInfo,
    pub(crate) rules: Vec<InteractionRule>,
    pub(crate) keys: Vec<RuleKeys>,
    /// Normalized primary -> rule indices in document order.
    pub(crate) by_primary: HashMap<String, Vec<usize>>,
    /// (normalized primary, normalized example) -> first rule listing it.
    pub(crate) by_example: HashMap<(String, String), usize>,
    /// Normalized example -> first fallback rule listing it.
    pub(crate) fallback_examples: HashMap<String, usize>,
}

impl InteractionIndex {
    pub fn from_source(source: &DocumentSource) -> Result<Self, InteractionError> {
        Self::from_json(&source.read(BUNDLED_INTERACTION_RULES)?)
    }

    pub fn from_json(json: &str) -> Result<Self, InteractionError> {
        let raw: RawDocument = serde_json::from_str(json).map_err(|source| InteractionError::Json {
            document: INTERACTION_RULES_FILE,
            source,
        })?;

        let rules = raw
            .rules
            .into_iter()
            .enumerate()
            .map(|(index, rule)| compile_rule(index, rule))
            .collect::<Result<Vec<_>, _>>()?;

        let index = Self::build(
            DocumentInfo {
                generated_at: raw.generated_at,
                version: raw.version,
                notes: raw.notes,
            },
            rules,
        );
        info!(
            rules = index.rules.len(),
            primary_groups = index.by_primary.len(),
            examples = index.by_example.len(),
            version = %index.info.version,
            "interaction rules loaded"
        );
        Ok(index)
    }

    fn build(info: DocumentInfo, rules: Vec<InteractionRule>) -> Self {
        let mut keys = Vec::with_capacity(rules.len());
        let mut by_primary: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_example = HashMap::new();
        let mut fallback_examples = HashMap::new();

        for (i, rule) in rules.iter().enumerate() {
            let rule_keys = RuleKeys {
                primary: normalize(&rule.primary),
                interaction_with: normalize(&rule.interaction_with),
                examples: rule.examples.iter().map(|e| normalize(e)).collect(),
            };

            by_primary.entry(rule_keys.primary.clone()).or_default().push(i);
            let is_fallback = FALLBACK_MARKERS
                .iter()
                .any(|marker| rule_keys.primary.contains(marker));
            for example in &rule_keys.examples {
                by_example
                    .entry((rule_keys.primary.clone(), example.clone()))
                    .or_insert(i);
                if is_fallback {
                    fallback_examples.entry(example.clone()).or_insert(i);
                }
            }
            keys.push(rule_keys);
        }

        Self {
            info,
            rules,
            keys,
            by_primary,
            by_example,
            fallback_examples,
        }
    }

    pub fn info(&self) -> &DocumentInfo {
        &self.info
    }

    /// Rules in document order.
    pub fn rules(&self) -> &[InteractionRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Primary groups as written in the document, sorted, without the
    /// generic fallback groups.
    pub fn available_primary_groups(&self) -> Vec<String> {
        let mut groups: Vec<String> = self
            .rules
            .iter()
            .map(|rule| rule.primary.as_str())
            .filter(|primary| !primary.contains("fallback") && !primary.contains("General"))
            .map(str::to_string)
            .collect();
        groups.sort();
        groups.dedup();
        groups
    }

    pub fn stats(&self) -> InteractionStats {
        let mut severity_breakdown = BTreeMap::new();
        for rule in &self.rules {
            *severity_breakdown
                .entry(rule.severity.as_str().to_string())
                .or_insert(0) += 1;
        }
        InteractionStats {
            total_rules: self.rules.len(),
            primary_groups: self.by_primary.len(),
            total_examples: self.rules.iter().map(|rule| rule.examples.len()).sum(),
            severity_breakdown,
        }
    }
}

fn compile_rule(index: usize, raw: RawRule) -> Result<InteractionRule, InteractionError> {
    let invalid = |reason: String| InteractionError::InvalidRule {
        index,
        primary: raw.primary.clone(),
        reason,
    };
    let severity = raw
        .severity
        .parse()
        .map_err(|e: CoreError| invalid(e.to_string()))?;
    if !raw.score.is_finite() {
        return Err(invalid(format!("score {} is not finite", raw.score)));
    }
    Ok(InteractionRule {
        primary: raw.primary,
        interaction_with: raw.interaction_with,
        examples: raw.examples,
        severity,
        score: raw.score,
        rationale: raw.rationale,
        recommended_action: raw.recommended_action,
        source: raw.source,
    })
}

/// Caches one [`InteractionIndex`] for the lifetime of the store.
#[derive(Debug, Default)]
pub struct InteractionStore {
    cached: OnceLock<Arc<InteractionIndex>>,
    init: Mutex<()>,
}

impl InteractionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load once; later calls return the cached index whatever source they
    /// pass. A failed load caches nothing.
    pub fn load(&self, source: &DocumentSource) -> Result<Arc<InteractionIndex>, InteractionError> {
        if let Some(index) = self.cached.get() {
            debug!("interaction index served from cache");
            return Ok(Arc::clone(index));
        }

        let _guard = self
            .init
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(index) = self.cached.get() {
            return Ok(Arc::clone(index));
        }

        let index = Arc::new(InteractionIndex::from_source(source)?);
        Ok(Arc::clone(self.cached.get_or_init(|| index)))
    }

    pub fn get(&self) -> Option<Arc<InteractionIndex>> {
        self.cached.get().cloned()
    }
}
