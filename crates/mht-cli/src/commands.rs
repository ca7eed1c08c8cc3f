//! Subcommand bodies. Each takes already-loaded stores and returns the JSON
//! value `main` prints.

use eyre::WrapErr;
use mht_core::models::fact::FactRecord;
use mht_interactions::pairs::{OptionalMedicine, PairTable, highest_severity};
use mht_interactions::resolver::MedicationQuery;
use mht_interactions::rules::InteractionIndex;
use mht_interactions::selection::{PatientHistory, review_selection};
use mht_rules::engine::DecisionEngine;
use mht_rules::normalize::from_assessment;
use serde_json::{Value, json};

/// Parse `name` or `name=category`.
pub fn parse_medication(arg: &str) -> MedicationQuery {
    match arg.split_once('=') {
        Some((name, category)) if !category.trim().is_empty() => {
            MedicationQuery::new(name.trim()).with_category(category.trim())
        }
        Some((name, _)) => MedicationQuery::new(name.trim()),
        None => MedicationQuery::new(arg.trim()),
    }
}

pub fn evaluate(
    engine: &DecisionEngine,
    input: &Value,
    assessment: bool,
    explain: bool,
) -> eyre::Result<Value> {
    let fact: FactRecord = if assessment {
        from_assessment(input)
    } else {
        serde_json::from_value(input.clone()).wrap_err("input is not a fact record")?
    };

    let output = if explain {
        serde_json::to_value(engine.explain(&fact))?
    } else {
        serde_json::to_value(engine.evaluate(&fact))?
    };
    Ok(output)
}

pub fn interactions(index: &InteractionIndex, primary: &str, meds: &[String]) -> eyre::Result<Value> {
    let queries: Vec<MedicationQuery> = meds.iter().map(|m| parse_medication(m)).collect();
    let results = index.analyze_medications_for_primary(primary, &queries);
    let unknown: Vec<&str> = queries
        .iter()
        .filter(|q| !results.iter().any(|r| r.medication == q.name))
        .map(|q| q.name.as_str())
        .collect();

    tracing::info!(
        primary,
        checked = queries.len(),
        matched = results.len(),
        "interaction analysis complete"
    );

    Ok(json!({
        "primary": primary,
        "results": results,
        "display": results.iter().map(|r| r.display()).collect::<Vec<_>>(),
        "unknown": unknown,
    }))
}

pub fn pair(table: &PairTable, main: &str, optionals: &[String]) -> eyre::Result<Value> {
    let optionals: Vec<OptionalMedicine> = optionals
        .iter()
        .map(|name| OptionalMedicine::new(name.as_str()))
        .collect();
    let checks = table.check(main, &optionals);
    let severities: Vec<_> = checks.iter().map(|c| c.severity).collect();

    Ok(json!({
        "main": main,
        "checks": checks,
        "highest": (!severities.is_empty()).then(|| highest_severity(&severities)),
        "table_version": table.version(),
    }))
}

/// Pairwise interactions across `medicines` plus history alerts. A missing
/// patient means a clean history.
pub fn selection(
    table: &PairTable,
    medicines: &[String],
    patient: Option<&Value>,
) -> eyre::Result<Value> {
    let patient: PatientHistory = match patient {
        Some(value) => {
            serde_json::from_value(value.clone()).wrap_err("patient is not a history record")?
        }
        None => PatientHistory::default(),
    };
    let report = review_selection(table, medicines, &patient);
    Ok(serde_json::to_value(report)?)
}

pub fn groups(index: &InteractionIndex) -> eyre::Result<Value> {
    Ok(json!({
        "groups": index.available_primary_groups(),
        "stats": index.stats(),
    }))
}
