// src/cli/mod.rs
//! CLI argument model and command handlers.

pub mod args;
pub mod dispatch;
pub mod handlers;

pub use args::{Cli, Commands, ReportFormat};
