use mht_core::models::action::Action;
use mht_core::models::suitability::Suitability;

use crate::ClinicalOverride;

/// Anticoagulants with any systemic estrogen: bleeding risk outweighs the
/// generic drug-class entry, so the action is a hard contraindication.
pub struct AnticoagulantEstrogen;

impl ClinicalOverride for AnticoagulantEstrogen {
    fn id(&self) -> &str {
        "anticoagulant_interaction"
    }

    fn applies(&self, med: &str, therapy: &str) -> bool {
        med == "anticoagulants" && therapy.starts_with("estrogen")
    }

    fn action(&self) -> Action {
        Action::new(
            "Avoid systemic estrogen; prefer non-hormonal or consult specialist",
            Suitability::Contraindicated,
            "Anticoagulant present increases bleeding risk with systemic estrogen.",
        )
    }
}
