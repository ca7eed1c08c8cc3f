//! mht-rules
//!
//! The tiered treatment decision engine. Rule documents are loaded once into
//! an immutable [`store::RuleSet`]; every evaluation is a function of that
//! set and one fact record.

pub mod condition;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod overrides;
pub mod store;
pub mod tier;

use mht_core::models::action::Action;

/// A hard-coded clinical rule applied during the medication pass, on top of
/// whatever the drug-class document says.
pub trait ClinicalOverride: Send + Sync {
    /// Warning id pushed when the override fires (e.g. "anticoagulant_interaction").
    fn id(&self) -> &str;

    /// Whether this medication combined with the selected therapy triggers
    /// the override.
    fn applies(&self, med: &str, therapy: &str) -> bool;

    /// The action contributed to ranking.
    fn action(&self) -> Action;
}

/// Return all registered overrides, in the order they are checked.
pub fn all_overrides() -> Vec<Box<dyn ClinicalOverride>> {
    vec![
        Box::new(overrides::anticoagulant::AnticoagulantEstrogen),
        Box::new(overrides::anticonvulsant::AnticonvulsantOralEstrogen),
    ]
}

/// Look up an override by its warning id.
pub fn get_override(id: &str) -> Option<Box<dyn ClinicalOverride>> {
    all_overrides().into_iter().find(|o| o.id() == id)
}
