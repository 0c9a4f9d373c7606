//! Attendance tracker CLI library.
//!
//! This crate provides the interactive interface around `att-core`: input
//! parsing, rendering, configuration and the menu shell.

mod cli;
pub mod commands;
mod config;
pub mod input;
pub mod render;
pub mod shell;

pub use cli::{Cli, Commands};
pub use config::Config;
