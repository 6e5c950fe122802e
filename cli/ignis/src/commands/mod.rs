//! Subcommand implementations for the ignis CLI.

pub mod generate;
pub mod profile;
