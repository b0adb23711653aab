//! Subcommand implementations.

pub mod alert;
pub mod compile;
pub mod services;
pub mod triage;
