use mht_core::models::fact::FactRecord;
use mht_core::models::risk::{RiskCategory, RiskModel};
use mht_rules::condition::{Condition, Predicate};
use mht_rules::error::LoadError;
use serde_json::{Value, json};

fn compile(condition: Value) -> Condition {
    let Value::Object(raw) = condition else {
        panic!("condition fixture must be an object");
    };
    Condition::compile("test_rule", &raw).unwrap()
}

fn compile_err(condition: Value) -> LoadError {
    let Value::Object(raw) = condition else {
        panic!("condition fixture must be an object");
    };
    Condition::compile("test_rule", &raw).unwrap_err()
}

#[test]
fn empty_condition_matches_everything() {
    let condition = compile(json!({}));
    assert!(condition.is_unconditional());
    assert!(condition.matches(&FactRecord::new()));
    assert!(condition.matches(&FactRecord::new().with_age(70.0).with_med("warfarin")));
}

#[test]
fn predicates_compile_by_value_shape() {
    let condition = compile(json!({
        "symptom_severity": { "gte": 4 },
        "meds_include": "warfarin",
        "therapy_selected": ["estrogen_oral", "combined_oral"],
        "breast_cancer_active": true,
        "ASCVD_category": "high",
        "smoker_status": "current"
    }));
    let predicates: Vec<_> = condition.clauses().iter().map(|c| c.predicate.clone()).collect();
    assert_eq!(
        predicates,
        vec![
            Predicate::Range {
                lte: None,
                gte: Some(4.0)
            },
            Predicate::Contains("warfarin".to_string()),
            Predicate::MemberOf(vec![json!("estrogen_oral"), json!("combined_oral")]),
            Predicate::BooleanEquals(true),
            Predicate::CategoryEquals("high".to_string()),
            Predicate::Equals(json!("current")),
        ]
    );
}

#[test]
fn range_requires_every_bound() {
    let condition = compile(json!({ "symptom_severity": { "gte": 4, "lte": 7 } }));
    assert!(condition.matches(&FactRecord::new().with_symptom_severity(4.0)));
    assert!(condition.matches(&FactRecord::new().with_symptom_severity(7.0)));
    assert!(!condition.matches(&FactRecord::new().with_symptom_severity(3.0)));
    assert!(!condition.matches(&FactRecord::new().with_symptom_severity(8.0)));
}

#[test]
fn range_fails_on_missing_value() {
    let condition = compile(json!({ "age": { "gte": 60 } }));
    assert!(!condition.matches(&FactRecord::new()));
    assert!(condition.matches(&FactRecord::new().with_age(60.0)));
}

#[test]
fn range_applies_to_extra_numeric_fields() {
    let condition = compile(json!({ "bmi": { "lte": 30 } }));
    assert!(condition.matches(&FactRecord::new().with_field("bmi", 24.5)));
    assert!(!condition.matches(&FactRecord::new().with_field("bmi", 31)));
    assert!(!condition.matches(&FactRecord::new().with_field("bmi", "24")));
}

#[test]
fn meds_include_is_exact_element_match() {
    let condition = compile(json!({ "meds_include": "warfarin" }));
    assert!(condition.matches(&FactRecord::new().with_meds(["aspirin", "warfarin"])));
    assert!(!condition.matches(&FactRecord::new().with_med("warfarin sodium")));
    assert!(!condition.matches(&FactRecord::new()));
}

#[test]
fn member_of_checks_field_value() {
    let condition = compile(json!({ "therapy_selected": ["estrogen_oral", "tibolone"] }));
    assert!(condition.matches(&FactRecord::new().with_therapy("tibolone")));
    assert!(!condition.matches(&FactRecord::new().with_therapy("estrogen_transdermal")));
    assert!(!condition.matches(&FactRecord::new()));
}

#[test]
fn boolean_true_requires_literal_true() {
    let condition = compile(json!({ "breast_cancer_active": true }));
    assert!(condition.matches(&FactRecord::new().with_flag("breast_cancer_active", true)));
    assert!(!condition.matches(&FactRecord::new().with_flag("breast_cancer_active", false)));
    assert!(!condition.matches(&FactRecord::new().with_field("breast_cancer_active", "true")));
    assert!(!condition.matches(&FactRecord::new()));
}

#[test]
fn boolean_false_matches_anything_not_true() {
    let condition = compile(json!({ "smoker": false }));
    assert!(condition.matches(&FactRecord::new()));
    assert!(condition.matches(&FactRecord::new().with_flag("smoker", false)));
    assert!(!condition.matches(&FactRecord::new().with_flag("smoker", true)));
}

#[test]
fn category_clause_reads_derived_category() {
    let condition = compile(json!({ "ASCVD_category": "intermediate" }));
    let mut fact = FactRecord::new();
    assert!(!condition.matches(&fact));

    fact.categories = Some(
        [(RiskModel::Ascvd, RiskCategory::Intermediate)]
            .into_iter()
            .collect(),
    );
    assert!(condition.matches(&fact));

    fact.categories = Some([(RiskModel::Ascvd, RiskCategory::High)].into_iter().collect());
    assert!(!condition.matches(&fact));
}

#[test]
fn equality_compares_numbers_by_value() {
    let condition = compile(json!({ "symptom_severity": 1 }));
    assert!(condition.matches(&FactRecord::new().with_symptom_severity(1.0)));
    assert!(!condition.matches(&FactRecord::new().with_symptom_severity(2.0)));
}

#[test]
fn equality_on_strings_is_strict() {
    let condition = compile(json!({ "therapy_selected": "estrogen_oral" }));
    assert!(condition.matches(&FactRecord::new().with_therapy("estrogen_oral")));
    assert!(!condition.matches(&FactRecord::new().with_therapy("Estrogen_Oral")));
}

#[test]
fn all_clauses_must_hold() {
    let condition = compile(json!({
        "meds_include": "warfarin",
        "therapy_selected": "estrogen_oral"
    }));
    let both = FactRecord::new().with_med("warfarin").with_therapy("estrogen_oral");
    assert!(condition.matches(&both));
    assert!(!condition.matches(&FactRecord::new().with_med("warfarin")));
    assert!(!condition.matches(&FactRecord::new().with_therapy("estrogen_oral")));
}

#[test]
fn malformed_clauses_are_load_errors() {
    let cases = [
        json!({ "age": { "gt": 50 } }),
        json!({ "age": { "gte": "fifty" } }),
        json!({ "meds_include": ["warfarin"] }),
        json!({ "meds_include": {} }),
        json!({ "meds_include": { "gte": 1 } }),
        json!({ "ASCVD_category": 3 }),
    ];
    for case in cases {
        assert!(
            matches!(compile_err(case.clone()), LoadError::InvalidCondition { ref rule_id, .. } if rule_id == "test_rule"),
            "{case} should not compile"
        );
    }
}

#[test]
fn meds_include_object_does_not_become_a_range() {
    let err = compile_err(json!({ "meds_include": {} }));
    assert!(matches!(
        err,
        LoadError::InvalidCondition { ref field, .. } if field == "meds_include"
    ));
}
