use mht_core::models::action::Action;
use mht_core::models::suitability::Suitability;

use crate::ClinicalOverride;

/// Enzyme-inducing anticonvulsants lower oral estrogen exposure.
pub struct AnticonvulsantOralEstrogen;

impl ClinicalOverride for AnticonvulsantOralEstrogen {
    fn id(&self) -> &str {
        "anticonvulsant_interaction"
    }

    fn applies(&self, med: &str, therapy: &str) -> bool {
        med == "anticonvulsants" && therapy == "estrogen_oral"
    }

    fn action(&self) -> Action {
        Action::new(
            "Estrogen efficacy may be reduced; consider transdermal or adjust plan",
            Suitability::UseWithCaution,
            "Anticonvulsant may reduce oral estrogen levels.",
        )
    }
}
