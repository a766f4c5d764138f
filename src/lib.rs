// src/lib.rs
//! Heuristic UX scoring for UI components.
//!
//! Four analyzers ([`visual`], [`animation`], [`cognitive`], [`tokens`]) each
//! reduce component source text to a bounded score plus severity-tagged
//! issues; [`aggregate::Aggregator`] runs them together and builds the
//! combined report.

pub mod aggregate;
pub mod analyzer;
pub mod animation;
pub mod artifact;
pub mod cli;
pub mod cognitive;
pub mod config;
pub mod error;
pub mod exit;
pub mod logging;
pub mod markup;
pub mod output;
pub mod tokens;
pub mod types;
pub mod utils;
pub mod visual;

pub use aggregate::{Aggregator, UxReport};
pub use analyzer::Analyzer;
pub use artifact::{ComponentArtifact, Source};
pub use config::Config;
pub use error::{Result, UxError};
pub use types::{AnalysisResult, Dimension, Issue, Severity};
