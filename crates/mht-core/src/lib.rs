//! mht-core
//!
//! Pure domain types shared by the decision engine and the interaction
//! resolver. No I/O; this is the shared vocabulary of the MHT system.

pub mod error;
pub mod models;
