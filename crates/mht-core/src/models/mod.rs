pub mod action;
pub mod decision;
pub mod fact;
pub mod interaction;
pub mod risk;
pub mod suitability;
