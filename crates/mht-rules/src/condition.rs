//! Rule conditions, compiled once at load time into tagged predicates.
//!
//! A condition is a set of clauses that must all hold. There is no
//! disjunction inside a rule; alternatives are written as separate rules.
//! An empty condition matches every fact.

use mht_core::models::fact::FactRecord;
use serde_json::{Map, Value};

use crate::error::LoadError;

pub const MEDS_INCLUDE: &str = "meds_include";
const CATEGORY_SUFFIX: &str = "category";

/// One comparison against a single fact field.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Strict equality. Numbers compare by value, so `1` equals `1.0`.
    Equals(Value),
    /// Inclusive numeric bounds; an absent bound is unconstrained.
    Range { lte: Option<f64>, gte: Option<f64> },
    /// The fact value must be one of the listed values.
    MemberOf(Vec<Value>),
    /// The fact's medication list must contain this exact entry.
    Contains(String),
    /// Only a literal `true` in the fact counts as true.
    BooleanEquals(bool),
    /// Exact match against a derived risk category label.
    CategoryEquals(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub field: String,
    pub predicate: Predicate,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Condition {
    clauses: Vec<Clause>,
}

impl Condition {
    /// Compile the raw `condition` object of a rule document.
    pub fn compile(rule_id: &str, raw: &Map<String, Value>) -> Result<Self, LoadError> {
        let clauses = raw
            .iter()
            .map(|(field, value)| {
                compile_predicate(rule_id, field, value).map(|predicate| Clause {
                    field: field.clone(),
                    predicate,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { clauses })
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_unconditional(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, fact: &FactRecord) -> bool {
        self.clauses.iter().all(|clause| clause.matches(fact))
    }
}

impl Clause {
    pub fn matches(&self, fact: &FactRecord) -> bool {
        match &self.predicate {
            Predicate::Range { lte, gte } => {
                let value = fact.number_field(&self.field);
                let within_upper = lte.is_none_or(|bound| value.is_some_and(|v| v <= bound));
                let within_lower = gte.is_none_or(|bound| value.is_some_and(|v| v >= bound));
                within_upper && within_lower
            }
            Predicate::Contains(med) => fact.has_med(med),
            Predicate::MemberOf(allowed) => fact
                .field(&self.field)
                .is_some_and(|actual| allowed.iter().any(|candidate| json_eq(candidate, &actual))),
            Predicate::BooleanEquals(expected) => {
                let actual = matches!(fact.field(&self.field).as_deref(), Some(Value::Bool(true)));
                actual == *expected
            }
            Predicate::CategoryEquals(label) => fact
                .field(&self.field)
                .is_some_and(|actual| actual.as_str() == Some(label.as_str())),
            Predicate::Equals(expected) => fact
                .field(&self.field)
                .is_some_and(|actual| json_eq(expected, &actual)),
        }
    }
}

fn compile_predicate(rule_id: &str, field: &str, value: &Value) -> Result<Predicate, LoadError> {
    let invalid = |reason: &str| LoadError::InvalidCondition {
        rule_id: rule_id.to_string(),
        field: field.to_string(),
        reason: reason.to_string(),
    };

    if field == MEDS_INCLUDE {
        return value
            .as_str()
            .map(|med| Predicate::Contains(med.to_string()))
            .ok_or_else(|| invalid("expected a medication name"));
    }

    if let Value::Object(bounds) = value {
        return compile_range(bounds).map_err(|reason| invalid(&reason));
    }

    match value {
        Value::Array(allowed) => Ok(Predicate::MemberOf(allowed.clone())),
        Value::Bool(expected) => Ok(Predicate::BooleanEquals(*expected)),
        _ if field.ends_with(CATEGORY_SUFFIX) => value
            .as_str()
            .map(|label| Predicate::CategoryEquals(label.to_string()))
            .ok_or_else(|| invalid("expected a category label")),
        _ => Ok(Predicate::Equals(value.clone())),
    }
}

fn compile_range(bounds: &Map<String, Value>) -> Result<Predicate, String> {
    let mut lte = None;
    let mut gte = None;
    for (key, bound) in bounds {
        let number = bound
            .as_f64()
            .ok_or_else(|| format!("bound '{key}' is not a number"))?;
        match key.as_str() {
            "lte" => lte = Some(number),
            "gte" => gte = Some(number),
            other => return Err(format!("unsupported range operator '{other}'")),
        }
    }
    Ok(Predicate::Range { lte, gte })
}

fn json_eq(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => expected == actual,
    }
}
