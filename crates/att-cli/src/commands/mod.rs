//! CLI subcommand implementations.

pub mod config;
pub mod shell;
