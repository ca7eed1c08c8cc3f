//! Rule Store: loads the three rule documents into an immutable [`RuleSet`].
//!
//! A [`RuleStore`] is owned by the composition root and caches the first
//! successful load for the rest of the process. Loading is atomic: callers
//! get either a complete set or a [`LoadError`].

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use mht_core::error::CoreError;
use mht_core::models::action::Action;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::condition::Condition;
use crate::error::LoadError;
use crate::normalize::{RiskThresholds, Threshold};
use crate::tier::Tier;

pub const TREATMENT_RULES_FILE: &str = "treatment_rules.json";
pub const RISK_THRESHOLDS_FILE: &str = "risk_thresholds.json";
pub const DRUG_INTERACTIONS_FILE: &str = "drug_interactions.json";

const BUNDLED_TREATMENT_RULES: &str = include_str!("../rules/treatment_rules.json");
const BUNDLED_RISK_THRESHOLDS: &str = include_str!("../rules/risk_thresholds.json");
const BUNDLED_DRUG_INTERACTIONS: &str = include_str!("../rules/drug_interactions.json");

/// Where rule documents come from.
#[derive(Debug, Clone)]
pub enum RuleSource {
    /// The documents shipped inside this crate.
    Bundled,
    /// A directory holding the three documents under their standard names.
    Directory(PathBuf),
    /// In-memory JSON, e.g. test fixtures.
    Documents {
        treatment_rules: String,
        risk_thresholds: String,
        drug_interactions: String,
    },
}

/// A compiled rule.
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: String,
    pub tier: Tier,
    pub condition: Condition,
    pub action: Action,
}

/// One therapy interaction listed under a drug class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassInteraction {
    /// Therapy key as written in the document, e.g. `estrogen_oral`.
    pub therapy: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrugClass {
    pub key: String,
    pub name: Option<String>,
    pub examples: Vec<String>,
    /// In document order.
    pub interactions: Vec<ClassInteraction>,
}

impl ClassInteraction {
    /// Documents sometimes spell therapies without their first underscore
    /// (`estrogenoral`); both spellings select this interaction.
    pub fn applies_to(&self, therapy: &str) -> bool {
        therapy == self.therapy || therapy == self.therapy.replacen('_', "", 1)
    }
}

/// The immutable, fully indexed result of a load.
#[derive(Debug)]
pub struct RuleSet {
    tiers: HashMap<Tier, Vec<Rule>>,
    by_id: HashMap<String, (Tier, usize)>,
    thresholds: RiskThresholds,
    drug_classes: HashMap<String, DrugClass>,
}

#[derive(Deserialize)]
struct RawRule {
    id: String,
    #[serde(default)]
    condition: Map<String, Value>,
    action: RawAction,
}

#[derive(Deserialize)]
struct RawAction {
    recommendation: String,
    suitability: String,
    rationale: String,
}

#[derive(Deserialize)]
struct RawDrugInteractions {
    #[serde(rename = "drugClasses")]
    drug_classes: Map<String, Value>,
}

#[derive(Deserialize)]
struct RawDrugClass {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    examples: Vec<String>,
    #[serde(default)]
    interactions: Map<String, Value>,
}

impl RuleSet {
    pub fn from_source(source: &RuleSource) -> Result<Self, LoadError> {
        match source {
            RuleSource::Bundled => Self::from_documents(
                BUNDLED_TREATMENT_RULES,
                BUNDLED_RISK_THRESHOLDS,
                BUNDLED_DRUG_INTERACTIONS,
            ),
            RuleSource::Directory(dir) => {
                let treatment_rules = read_document(dir, TREATMENT_RULES_FILE)?;
                let risk_thresholds = read_document(dir, RISK_THRESHOLDS_FILE)?;
                let drug_interactions = read_document(dir, DRUG_INTERACTIONS_FILE)?;
                Self::from_documents(&treatment_rules, &risk_thresholds, &drug_interactions)
            }
            RuleSource::Documents {
                treatment_rules,
                risk_thresholds,
                drug_interactions,
            } => Self::from_documents(treatment_rules, risk_thresholds, drug_interactions),
        }
    }

    pub fn from_documents(
        treatment_rules: &str,
        risk_thresholds: &str,
        drug_interactions: &str,
    ) -> Result<Self, LoadError> {
        let mut document: Map<String, Value> =
            serde_json::from_str(treatment_rules).map_err(|source| LoadError::Json {
                document: TREATMENT_RULES_FILE,
                source,
            })?;

        let mut tiers = HashMap::new();
        let mut by_id = HashMap::new();
        for tier in Tier::ORDER {
            let raw = document
                .remove(tier.key())
                .ok_or(LoadError::MissingTier(tier.key()))?;
            let raw: Vec<RawRule> =
                serde_json::from_value(raw).map_err(|source| LoadError::Json {
                    document: TREATMENT_RULES_FILE,
                    source,
                })?;

            let mut rules = Vec::with_capacity(raw.len());
            for (index, rule) in raw.into_iter().enumerate() {
                if by_id.insert(rule.id.clone(), (tier, index)).is_some() {
                    return Err(LoadError::DuplicateRuleId(rule.id));
                }
                rules.push(compile_rule(tier, rule)?);
            }
            tiers.insert(tier, rules);
        }

        let raw_thresholds: BTreeMap<String, Threshold> = serde_json::from_str(risk_thresholds)
            .map_err(|source| LoadError::Json {
                document: RISK_THRESHOLDS_FILE,
                source,
            })?;
        let thresholds = RiskThresholds::from_document(&raw_thresholds)?;

        let raw_classes: RawDrugInteractions =
            serde_json::from_str(drug_interactions).map_err(|source| LoadError::Json {
                document: DRUG_INTERACTIONS_FILE,
                source,
            })?;
        let drug_classes = compile_drug_classes(raw_classes)?;

        let set = Self {
            tiers,
            by_id,
            thresholds,
            drug_classes,
        };
        info!(
            rules = set.len(),
            contraindication = set.tier(Tier::Contraindication).len(),
            high_risk = set.tier(Tier::HighRisk).len(),
            moderate_risk = set.tier(Tier::ModerateRisk).len(),
            default = set.tier(Tier::Default).len(),
            drug_classes = set.drug_classes.len(),
            "treatment rules loaded"
        );
        Ok(set)
    }

    /// Rules of one tier in document order.
    pub fn tier(&self, tier: Tier) -> &[Rule] {
        self.tiers.get(&tier).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn rule(&self, id: &str) -> Option<&Rule> {
        let (tier, index) = self.by_id.get(id)?;
        self.tier(*tier).get(*index)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn thresholds(&self) -> &RiskThresholds {
        &self.thresholds
    }

    pub fn drug_class(&self, key: &str) -> Option<&DrugClass> {
        self.drug_classes.get(key)
    }
}

fn read_document(dir: &Path, name: &str) -> Result<String, LoadError> {
    let path = dir.join(name);
    debug!(path = %path.display(), "reading rule document");
    std::fs::read_to_string(&path).map_err(|source| LoadError::Io { path, source })
}

fn compile_rule(tier: Tier, raw: RawRule) -> Result<Rule, LoadError> {
    let condition = Condition::compile(&raw.id, &raw.condition)?;
    let suitability = raw
        .action
        .suitability
        .parse()
        .map_err(|e: CoreError| LoadError::InvalidAction {
            rule_id: raw.id.clone(),
            reason: e.to_string(),
        })?;
    Ok(Rule {
        id: raw.id,
        tier,
        condition,
        action: Action {
            recommendation: raw.action.recommendation,
            suitability,
            rationale: raw.action.rationale,
        },
    })
}

fn compile_drug_classes(raw: RawDrugInteractions) -> Result<HashMap<String, DrugClass>, LoadError> {
    let mut classes = HashMap::with_capacity(raw.drug_classes.len());
    for (key, value) in raw.drug_classes {
        let class: RawDrugClass =
            serde_json::from_value(value).map_err(|e| LoadError::InvalidDrugClass {
                class: key.clone(),
                reason: e.to_string(),
            })?;
        let interactions = class
            .interactions
            .into_iter()
            .map(|(therapy, description)| match description {
                Value::String(description) => Ok(ClassInteraction {
                    therapy,
                    description,
                }),
                other => Err(LoadError::InvalidDrugClass {
                    class: key.clone(),
                    reason: format!("interaction '{therapy}' has non-text description {other}"),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        classes.insert(
            key.clone(),
            DrugClass {
                key,
                name: class.name,
                examples: class.examples,
                interactions,
            },
        );
    }
    Ok(classes)
}

/// Caches one [`RuleSet`] for the lifetime of the store. The first
/// successful load wins; later calls return the same `Arc` whatever source
/// they pass.
#[derive(Debug, Default)]
pub struct RuleStore {
    cached: OnceLock<Arc<RuleSet>>,
    init: Mutex<()>,
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&self, source: &RuleSource) -> Result<Arc<RuleSet>, LoadError> {
        if let Some(set) = self.cached.get() {
            debug!("rule set served from cache");
            return Ok(Arc::clone(set));
        }

        // Serialize first loads so indices are built exactly once.
        let _guard = self
            .init
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(set) = self.cached.get() {
            return Ok(Arc::clone(set));
        }

        let set = Arc::new(RuleSet::from_source(source)?);
        Ok(Arc::clone(self.cached.get_or_init(|| set)))
    }

    /// The cached set, if a load has succeeded.
    pub fn get(&self) -> Option<Arc<RuleSet>> {
        self.cached.get().cloned()
    }
}
