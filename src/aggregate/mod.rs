// src/aggregate/mod.rs
//! Runs every enabled analyzer over a component and folds the results into
//! one [`UxReport`].

pub mod report;

pub use self::report::{format_batch_summary, format_terminal, print_report, to_json};

use crate::analyzer::Analyzer;
use crate::animation::{AnimationAnalyzer, AnimationMetrics};
use crate::artifact::{sanitize_id, ComponentArtifact};
use crate::cognitive::{CognitiveLoadSimulator, CognitiveMetrics, TaskSpec};
use crate::config::Config;
use crate::error::{Result, UxError};
use crate::output;
use crate::tokens::{TokenAnalysis, TokenExtractor};
use crate::types::{penalty_score, AnalysisResult, Dimension, Issue, Severity, MAX_SCORE};
use crate::visual::{Browser, VisualAnalyzer, VisualMetrics};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Score summary for one dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionScore {
    pub dimension: Dimension,
    pub score: f64,
    pub issue_count: usize,
    pub failed: bool,
    pub duration_ms: u128,
}

/// The combined per-component report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UxReport {
    pub component_id: String,
    /// Mean of the scores of the analyzers that ran.
    pub score: f64,
    pub max_score: f64,
    /// `100 - Σ severity penalty` over all issues.
    pub issue_score: f64,
    pub dimensions: Vec<DimensionScore>,
    pub issues: Vec<Issue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visual: Option<AnalysisResult<VisualMetrics>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<AnalysisResult<AnimationMetrics>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cognitive: Option<AnalysisResult<CognitiveMetrics>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<AnalysisResult<TokenAnalysis>>,
    pub timestamp: DateTime<Utc>,
    pub duration_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_path: Option<PathBuf>,
}

impl UxReport {
    #[must_use]
    pub fn dimension(&self, dimension: Dimension) -> Option<&DimensionScore> {
        self.dimensions.iter().find(|d| d.dimension == dimension)
    }

    #[must_use]
    pub fn count_at_least(&self, floor: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity >= floor).count()
    }
}

/// Owns one configured instance of each analyzer.
pub struct Aggregator {
    config: Config,
    visual: VisualAnalyzer,
    animation: AnimationAnalyzer,
    cognitive: CognitiveLoadSimulator,
    tokens: TokenExtractor,
}

impl Aggregator {
    /// Validates `config` and builds the analyzers.
    ///
    /// # Errors
    /// Returns `UxError::Config` if the configuration is invalid.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let visual = VisualAnalyzer::new(config.visual.clone())
            .with_output_dir(config.dimension_dir(Dimension::Visual))
            .with_baseline_dir(config.baseline_dir())
            .with_timeout(Duration::from_millis(config.analysis_timeout_ms));
        let animation = AnimationAnalyzer::new(config.animation.clone(), config.seed)
            .with_output_dir(config.dimension_dir(Dimension::Animation));
        let cognitive = CognitiveLoadSimulator::new(config.cognitive.clone());
        let tokens = TokenExtractor::new(config.tokens.clone());
        Ok(Self { config, visual, animation, cognitive, tokens })
    }

    #[must_use]
    pub fn with_browser(mut self, browser: Arc<dyn Browser>) -> Self {
        self.visual = self.visual.with_browser(browser);
        self
    }

    #[must_use]
    pub fn with_tasks(mut self, tasks: Vec<TaskSpec>) -> Self {
        self.cognitive = self.cognitive.with_tasks(tasks);
        self
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn visual(&self) -> &VisualAnalyzer {
        &self.visual
    }

    fn run<A: Analyzer>(&self, analyzer: &A, artifact: &ComponentArtifact) -> Option<AnalysisResult<A::Metrics>> {
        let dimension = analyzer.dimension();
        if !self.config.is_enabled(dimension) {
            debug!(component = %artifact.component_id, %dimension, "dimension disabled");
            return None;
        }
        if !analyzer.applies_to(artifact) {
            debug!(component = %artifact.component_id, %dimension, "no applicable sources");
            return None;
        }
        Some(analyzer.analyze(artifact))
    }

    /// Analyzes one component. Never fails: analyzer errors degrade their own
    /// dimension and report-write failures are logged.
    #[must_use]
    pub fn analyze(&self, artifact: &ComponentArtifact) -> UxReport {
        let start = Instant::now();
        info!(component = %artifact.component_id, "analyzing component");

        let ((visual, animation), (cognitive, tokens)) = rayon::join(
            || rayon::join(|| self.run(&self.visual, artifact), || self.run(&self.animation, artifact)),
            || rayon::join(|| self.run(&self.cognitive, artifact), || self.run(&self.tokens, artifact)),
        );

        let mut report = combine(&artifact.component_id, visual, animation, cognitive, tokens);
        report.duration_ms = start.elapsed().as_millis();
        info!(component = %report.component_id, score = report.score, issues = report.issues.len(), "component analyzed");

        if self.config.write_reports {
            match self.write(&report) {
                Ok(path) => report.report_path = Some(path),
                Err(e) => warn!(component = %report.component_id, error = %e, "failed to write report"),
            }
        }
        report
    }

    /// Analyzes components in parallel on a pool of `max_workers` threads.
    /// Reports come back in input order.
    ///
    /// # Errors
    /// Returns error if the worker pool cannot be built.
    pub fn analyze_batch(&self, artifacts: &[ComponentArtifact]) -> Result<Vec<UxReport>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.max_workers)
            .build()
            .map_err(|e| UxError::Config(format!("cannot build worker pool: {e}")))?;
        info!(components = artifacts.len(), workers = self.config.max_workers, "batch started");
        Ok(pool.install(|| artifacts.par_iter().map(|a| self.analyze(a)).collect()))
    }

    /// Writes per-dimension results and the combined report.
    fn write(&self, report: &UxReport) -> Result<PathBuf> {
        let file = format!("{}.json", sanitize_id(&report.component_id));
        let dir = |d: Dimension| self.config.dimension_dir(d).join(&file);
        if let Some(r) = &report.visual {
            output::write_json(&dir(Dimension::Visual), r)?;
        }
        if let Some(r) = &report.animation {
            output::write_json(&dir(Dimension::Animation), r)?;
        }
        if let Some(r) = &report.cognitive {
            output::write_json(&dir(Dimension::CognitiveLoad), r)?;
        }
        if let Some(r) = &report.tokens {
            output::write_json(&dir(Dimension::DesignTokens), r)?;
        }
        let path = self.config.output_dir.join("reports").join(&file);
        output::write_json(&path, report)?;
        Ok(path)
    }
}

fn summary<M>(result: &AnalysisResult<M>) -> DimensionScore {
    DimensionScore {
        dimension: result.dimension,
        score: result.score,
        issue_count: result.issues.len(),
        failed: result.failed(),
        duration_ms: result.duration_ms,
    }
}

#[allow(clippy::cast_precision_loss)]
fn combine(
    component_id: &str,
    visual: Option<AnalysisResult<VisualMetrics>>,
    animation: Option<AnalysisResult<AnimationMetrics>>,
    cognitive: Option<AnalysisResult<CognitiveMetrics>>,
    tokens: Option<AnalysisResult<TokenAnalysis>>,
) -> UxReport {
    let mut dimensions = Vec::new();
    let mut issues = Vec::new();
    if let Some(r) = &visual {
        dimensions.push(summary(r));
        issues.extend(r.issues.iter().cloned());
    }
    if let Some(r) = &animation {
        dimensions.push(summary(r));
        issues.extend(r.issues.iter().cloned());
    }
    if let Some(r) = &cognitive {
        dimensions.push(summary(r));
        issues.extend(r.issues.iter().cloned());
    }
    if let Some(r) = &tokens {
        dimensions.push(summary(r));
        issues.extend(r.issues.iter().cloned());
    }

    let score = if dimensions.is_empty() {
        issues.push(empty_report_issue(component_id));
        0.0
    } else {
        dimensions.iter().map(|d| d.score).sum::<f64>() / dimensions.len() as f64
    };

    UxReport {
        component_id: component_id.to_string(),
        score,
        max_score: MAX_SCORE,
        issue_score: penalty_score(&issues),
        dimensions,
        issues,
        visual,
        animation,
        cognitive,
        tokens,
        timestamp: Utc::now(),
        duration_ms: 0,
        report_path: None,
    }
}

fn empty_report_issue(component_id: &str) -> Issue {
    let mut issue = Issue::new(
        "report-empty",
        "No analyzer ran",
        "The component has no markup, style or script, or every applicable dimension is disabled",
        Severity::Info,
    )
    .recommend("Provide component sources or enable at least one dimension");
    issue.component = Some(component_id.to_string());
    issue
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn aggregator(out: &std::path::Path) -> Aggregator {
        let mut config = Config::default();
        config.output_dir = out.to_path_buf();
        config.seed = Some(42);
        Aggregator::new(config).unwrap()
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = Config::default();
        config.max_workers = 0;
        assert!(matches!(Aggregator::new(config), Err(UxError::Config(_))));
    }

    #[test]
    fn empty_artifact_scores_zero_with_info_issue() {
        let dir = tempdir().unwrap();
        let r = aggregator(dir.path()).analyze(&ComponentArtifact::new("empty"));
        assert!(r.score.abs() < f64::EPSILON);
        assert!(r.dimensions.is_empty());
        assert_eq!(r.issues.len(), 1);
        assert_eq!(r.issues[0].id, "report-empty");
        assert_eq!(r.issues[0].severity, Severity::Info);
    }

    #[test]
    fn style_only_runs_tokens_and_animation() {
        let dir = tempdir().unwrap();
        let artifact = ComponentArtifact::new("s").with_style(".a { color: red; }");
        let r = aggregator(dir.path()).analyze(&artifact);
        let dims: Vec<Dimension> = r.dimensions.iter().map(|d| d.dimension).collect();
        assert_eq!(dims, vec![Dimension::Animation, Dimension::DesignTokens]);
        assert!(r.visual.is_none());
        assert!(r.cognitive.is_none());
    }

    #[test]
    fn score_is_mean_of_dimensions() {
        let dir = tempdir().unwrap();
        let artifact = ComponentArtifact::new("m")
            .with_markup("<p>Hello</p>")
            .with_style("p { color: #333; }");
        let r = aggregator(dir.path()).analyze(&artifact);
        let mean = r.dimensions.iter().map(|d| d.score).sum::<f64>() / r.dimensions.len() as f64;
        assert_eq!(r.dimensions.len(), 4);
        assert!((r.score - mean).abs() < 1e-9);
    }

    #[test]
    fn disabled_dimensions_are_skipped() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.output_dir = dir.path().to_path_buf();
        config.disable(Dimension::Visual);
        let r = Aggregator::new(config)
            .unwrap()
            .analyze(&ComponentArtifact::new("d").with_markup("<button>Go</button>"));
        assert!(r.dimension(Dimension::Visual).is_none());
        assert!(r.dimension(Dimension::CognitiveLoad).is_some());
    }

    #[test]
    fn reports_are_written_per_dimension_and_combined() {
        let dir = tempdir().unwrap();
        let artifact = ComponentArtifact::new("card").with_style(".a { margin: 4px; }");
        let r = aggregator(dir.path()).analyze(&artifact);
        let combined = dir.path().join("reports").join("card.json");
        assert_eq!(r.report_path.as_deref(), Some(combined.as_path()));
        assert!(combined.exists());
        assert!(dir.path().join("tokens").join("card.json").exists());
        assert!(!dir.path().join("visual").join("card.json").exists());
    }

    #[test]
    fn write_reports_can_be_disabled() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.output_dir = dir.path().join("out");
        config.write_reports = false;
        let r = Aggregator::new(config).unwrap().analyze(&ComponentArtifact::new("x").with_style("a{}"));
        assert!(r.report_path.is_none());
        assert!(!dir.path().join("out").join("reports").exists());
    }
}
