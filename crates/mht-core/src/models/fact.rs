use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

use super::risk::{RiskCategory, RiskModel};

/// Patient/decision context that rules are matched against.
///
/// Well-known fields are typed; anything else a rule document may reference
/// (boolean risk flags, free-form attributes) lives in `extra`. Typed fields
/// read leniently: numeric strings parse, and a value of the wrong type reads
/// as absent instead of rejecting the record. Risk categories are never read
/// from input; only the normalizer sets them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactRecord {
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub age: Option<f64>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub meds: Vec<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub therapy_selected: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub symptom_severity: Option<f64>,

    #[serde(
        rename = "ASCVD",
        default,
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub ascvd: Option<f64>,
    #[serde(
        rename = "Framingham",
        default,
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub framingham: Option<f64>,
    /// Older payloads send the Framingham score under this key.
    #[serde(
        rename = "Framingham_score",
        default,
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub framingham_score: Option<f64>,
    #[serde(
        rename = "Gail",
        default,
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub gail: Option<f64>,
    #[serde(
        rename = "TyrerCuzick",
        default,
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub tyrer_cuzick: Option<f64>,
    #[serde(
        rename = "Wells",
        default,
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub wells: Option<f64>,
    #[serde(
        rename = "FRAX",
        default,
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub frax: Option<f64>,

    #[serde(skip)]
    pub categories: Option<BTreeMap<RiskModel, RiskCategory>>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A number, or a string holding one. Anything else, including non-finite
/// values, is absent.
pub fn lenient_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|v| v.is_finite())
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_number(&Value::deserialize(deserializer)?))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(Some(text)),
        _ => Ok(None),
    }
}

/// Non-array values read as an empty list; non-string entries are dropped.
fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(med) => Some(med),
                _ => None,
            })
            .collect()),
        _ => Ok(Vec::new()),
    }
}

fn number(value: f64) -> Option<Value> {
    Number::from_f64(value).map(Value::Number)
}

impl FactRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_age(mut self, age: f64) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_therapy(mut self, therapy: impl Into<String>) -> Self {
        self.therapy_selected = Some(therapy.into());
        self
    }

    pub fn with_med(mut self, med: impl Into<String>) -> Self {
        self.meds.push(med.into());
        self
    }

    pub fn with_meds<I, S>(mut self, meds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.meds.extend(meds.into_iter().map(Into::into));
        self
    }

    pub fn with_symptom_severity(mut self, severity: f64) -> Self {
        self.symptom_severity = Some(severity);
        self
    }

    pub fn with_score(mut self, model: RiskModel, score: f64) -> Self {
        self.set_raw_score(model, Some(score));
        self
    }

    pub fn with_flag(self, name: impl Into<String>, value: bool) -> Self {
        self.with_field(name, Value::Bool(value))
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    pub fn set_raw_score(&mut self, model: RiskModel, score: Option<f64>) {
        let slot = match model {
            RiskModel::Ascvd => &mut self.ascvd,
            RiskModel::Framingham => &mut self.framingham,
            RiskModel::Gail => &mut self.gail,
            RiskModel::TyrerCuzick => &mut self.tyrer_cuzick,
            RiskModel::Wells => &mut self.wells,
            RiskModel::Frax => &mut self.frax,
        };
        *slot = score;
    }

    fn raw_score(&self, model: RiskModel) -> Option<f64> {
        match model {
            RiskModel::Ascvd => self.ascvd,
            RiskModel::Framingham => self.framingham,
            RiskModel::Gail => self.gail,
            RiskModel::TyrerCuzick => self.tyrer_cuzick,
            RiskModel::Wells => self.wells,
            RiskModel::Frax => self.frax,
        }
    }

    /// The score used for categorization. Framingham falls back to
    /// `Framingham_score` when absent or zero; non-finite values count as
    /// absent.
    pub fn risk_score(&self, model: RiskModel) -> Option<f64> {
        let raw = match model {
            RiskModel::Framingham => self
                .framingham
                .filter(|score| *score != 0.0 && score.is_finite())
                .or(self.framingham_score),
            other => self.raw_score(other),
        };
        raw.filter(|value| value.is_finite())
    }

    pub fn category(&self, model: RiskModel) -> Option<RiskCategory> {
        self.categories.as_ref()?.get(&model).copied()
    }

    pub fn is_normalized(&self) -> bool {
        self.categories.is_some()
    }

    pub fn has_med(&self, med: &str) -> bool {
        self.meds.iter().any(|m| m == med)
    }

    /// Resolve any field name a rule may reference to a JSON view of the
    /// fact's value. Typed fields are materialized; `extra` is borrowed.
    pub fn field(&self, name: &str) -> Option<Cow<'_, Value>> {
        match name {
            "age" => self.age.and_then(number).map(Cow::Owned),
            "meds" => Some(Cow::Owned(Value::Array(
                self.meds.iter().cloned().map(Value::String).collect(),
            ))),
            "therapy_selected" => self
                .therapy_selected
                .clone()
                .map(|t| Cow::Owned(Value::String(t))),
            "symptom_severity" => self.symptom_severity.and_then(number).map(Cow::Owned),
            "Framingham_score" => self.framingham_score.and_then(number).map(Cow::Owned),
            _ => {
                if let Ok(model) = name.parse::<RiskModel>() {
                    return self.raw_score(model).and_then(number).map(Cow::Owned);
                }
                if let Some(model) = RiskModel::from_category_key(name)
                    && let Some(category) = self.category(model)
                {
                    return Some(Cow::Owned(Value::String(category.as_str().to_string())));
                }
                self.extra.get(name).map(Cow::Borrowed)
            }
        }
    }

    pub fn number_field(&self, name: &str) -> Option<f64> {
        self.field(name)?.as_f64()
    }
}
