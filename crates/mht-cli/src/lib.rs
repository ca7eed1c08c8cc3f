//! mht-cli library root.
//!
//! Re-exports the config layer and subcommand bodies so integration tests
//! can exercise them without spawning the binary.

pub mod commands;
pub mod config;
