// src/analyzer.rs
//! The shared analyzer contract.
//!
//! Every analyzer implements [`Analyzer::evaluate`]; the provided
//! [`Analyzer::analyze`] wraps it with timing, score clamping, issue
//! stamping and the failure contract (score 0 plus one `ERROR` issue).

use crate::artifact::{ComponentArtifact, Source};
use crate::error::Result;
use crate::types::{clamp_score, AnalysisResult, Dimension, Issue, Scored, MAX_SCORE};
use chrono::Utc;
use serde::Serialize;
use std::borrow::Cow;
use std::time::Instant;
use tracing::{debug, warn};

pub trait Analyzer: Send + Sync {
    type Metrics: Serialize + Send;

    fn dimension(&self) -> Dimension;

    /// Whether the artifact carries the sources this analyzer reads.
    fn applies_to(&self, artifact: &ComponentArtifact) -> bool;

    /// Computes score, issues and metrics. Errors become a degraded result.
    ///
    /// # Errors
    /// Returns error when sources cannot be loaded or a collaborator fails.
    fn evaluate(&self, artifact: &ComponentArtifact) -> Result<Scored<Self::Metrics>>;

    /// Runs the analyzer. Never fails.
    fn analyze(&self, artifact: &ComponentArtifact) -> AnalysisResult<Self::Metrics> {
        let dimension = self.dimension();
        let timestamp = Utc::now();
        let start = Instant::now();
        debug!(component = %artifact.component_id, %dimension, "analysis started");

        let (score, issues, metrics) = match self.evaluate(artifact) {
            Ok(scored) => (clamp_score(scored.score), scored.issues, Some(scored.metrics)),
            Err(e) => {
                warn!(component = %artifact.component_id, %dimension, error = %e, "analysis failed");
                (0.0, vec![Issue::analyzer_failure(dimension, &e.to_string())], None)
            }
        };

        let issues = stamp(issues, &artifact.component_id, dimension);
        let duration_ms = start.elapsed().as_millis();
        debug!(component = %artifact.component_id, %dimension, score, duration_ms, "analysis finished");

        AnalysisResult {
            component_id: artifact.component_id.clone(),
            dimension,
            score,
            max_score: MAX_SCORE,
            issues,
            metrics,
            timestamp,
            duration_ms,
        }
    }
}

fn stamp(issues: Vec<Issue>, component: &str, dimension: Dimension) -> Vec<Issue> {
    issues
        .into_iter()
        .map(|mut issue| {
            issue.component.get_or_insert_with(|| component.to_string());
            issue.dimension.get_or_insert(dimension);
            issue
        })
        .collect()
}

/// Loads an optional source, passing absence through.
///
/// # Errors
/// Returns error if the source is a file that cannot be read.
pub fn load_optional(source: Option<&Source>) -> Result<Option<Cow<'_, str>>> {
    source.map(Source::load).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UxError;
    use crate::types::Severity;

    struct Fixed(Option<f64>);

    impl Analyzer for Fixed {
        type Metrics = ();

        fn dimension(&self) -> Dimension {
            Dimension::Animation
        }

        fn applies_to(&self, _: &ComponentArtifact) -> bool {
            true
        }

        fn evaluate(&self, _: &ComponentArtifact) -> Result<Scored<()>> {
            match self.0 {
                Some(score) => Ok(Scored { score, issues: Vec::new(), metrics: () }),
                None => Err(UxError::Render("browser crashed".to_string())),
            }
        }
    }

    #[test]
    fn out_of_range_scores_are_clamped() {
        let r = Fixed(Some(140.0)).analyze(&ComponentArtifact::new("c"));
        assert!((r.score - 100.0).abs() < f64::EPSILON);
        assert!(!r.failed());
    }

    #[test]
    fn errors_become_single_error_issue() {
        let r = Fixed(None).analyze(&ComponentArtifact::new("c"));
        assert!(r.failed());
        assert!(r.score.abs() < f64::EPSILON);
        assert_eq!(r.issues.len(), 1);
        assert_eq!(r.issues[0].id, "animation-error");
        assert_eq!(r.issues[0].severity, Severity::Error);
        assert!(r.issues[0].description.contains("browser crashed"));
        assert_eq!(r.issues[0].component.as_deref(), Some("c"));
    }
}
