//! Checks over a whole medicine selection: listed pair interactions between
//! the selected medicines, and patient history against estrogen therapy.

use mht_core::models::interaction::PairSeverity;
use serde::{Deserialize, Serialize};
use tracing::info;
use ts_rs::TS;

use crate::pairs::{PairTable, PairWarning, canonical_keys, highest_severity};

const ESTROGEN_KEY: &str = "hormone_estradiol";

/// History flags that bear on estrogen therapy. Missing flags are false.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientHistory {
    pub personal_history_breast_cancer: bool,
    #[serde(rename = "personalHistoryDVT", alias = "personalHistoryDvt")]
    pub personal_history_dvt: bool,
    pub liver_disease: bool,
    pub unexplained_vaginal_bleeding: bool,
    pub hypertension: bool,
    pub diabetes: bool,
    pub smoking: bool,
}

impl PatientHistory {
    fn absolute_conditions(&self) -> Vec<&'static str> {
        [
            (self.personal_history_breast_cancer, "Breast cancer history"),
            (self.personal_history_dvt, "DVT history"),
            (self.liver_disease, "Liver disease"),
            (self.unexplained_vaginal_bleeding, "Unexplained vaginal bleeding"),
        ]
        .into_iter()
        .filter_map(|(present, condition)| present.then_some(condition))
        .collect()
    }

    fn relative_conditions(&self) -> Vec<&'static str> {
        [
            (self.hypertension, "Hypertension"),
            (self.diabetes, "Diabetes"),
            (self.smoking, "Smoking"),
        ]
        .into_iter()
        .filter_map(|(present, condition)| present.then_some(condition))
        .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum AlertSeverity {
    Absolute,
    Relative,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ContraindicationAlert {
    pub severity: AlertSeverity,
    pub medicine: String,
    pub condition: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SelectionReport {
    pub interactions: Vec<PairWarning>,
    pub contraindications: Vec<ContraindicationAlert>,
    /// Strongest listed pair severity; `None` when no pair was found.
    pub highest: Option<PairSeverity>,
}

pub fn is_estrogen(medicine: &str) -> bool {
    canonical_keys(medicine).iter().any(|key| key == ESTROGEN_KEY)
}

/// Alerts for each estrogen-containing medicine. All absolute conditions
/// present collapse into one alert; each relative condition gets its own.
pub fn contraindication_alerts<S: AsRef<str>>(
    medicines: &[S],
    patient: &PatientHistory,
) -> Vec<ContraindicationAlert> {
    let absolute = patient.absolute_conditions();
    let relative = patient.relative_conditions();

    let mut alerts = Vec::new();
    for medicine in medicines.iter().map(AsRef::as_ref).filter(|m| is_estrogen(m)) {
        if !absolute.is_empty() {
            alerts.push(ContraindicationAlert {
                severity: AlertSeverity::Absolute,
                medicine: medicine.to_string(),
                condition: absolute.join(", "),
                recommendation: "Do not initiate. Consider alternative therapy.".to_string(),
            });
        }
        for condition in &relative {
            alerts.push(ContraindicationAlert {
                severity: AlertSeverity::Relative,
                medicine: medicine.to_string(),
                condition: condition.to_string(),
                recommendation: "Use with caution and enhanced monitoring".to_string(),
            });
        }
    }
    alerts
}

pub fn review_selection<S: AsRef<str>>(
    table: &PairTable,
    medicines: &[S],
    patient: &PatientHistory,
) -> SelectionReport {
    let interactions = table.pairwise(medicines);
    let contraindications = contraindication_alerts(medicines, patient);
    let severities: Vec<PairSeverity> = interactions.iter().map(|w| w.severity).collect();
    let highest = (!severities.is_empty()).then(|| highest_severity(&severities));

    info!(
        medicines = medicines.len(),
        interactions = interactions.len(),
        contraindications = contraindications.len(),
        "selection reviewed"
    );

    SelectionReport {
        interactions,
        contraindications,
        highest,
    }
}
