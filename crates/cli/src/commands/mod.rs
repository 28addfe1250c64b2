//! Subcommand implementations.

pub mod call;
pub mod migrate;
pub mod pinterest;
