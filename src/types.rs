// src/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound for every score in the crate.
pub const MAX_SCORE: f64 = 100.0;

/// Clamps a raw score into `[0, MAX_SCORE]`. NaN collapses to zero.
#[must_use]
pub fn clamp_score(raw: f64) -> f64 {
    if raw.is_nan() {
        return 0.0;
    }
    raw.clamp(0.0, MAX_SCORE)
}

/// Finding severity.
///
/// Carries both the report scale (`INFO`, `WARNING`, `ERROR`, `CRITICAL`) and the
/// analyzer-native scale (`LOW`, `MEDIUM`, `HIGH`). Variants are declared in
/// ascending order so the derived `Ord` is the severity order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Info,
    Low,
    Warning,
    Medium,
    High,
    Error,
    Critical,
}

impl Severity {
    /// Fixed score penalty. Non-decreasing in severity order.
    #[must_use]
    pub const fn penalty(self) -> f64 {
        match self {
            Self::Info | Self::Low => 5.0,
            Self::Warning | Self::Medium => 10.0,
            Self::High | Self::Error => 15.0,
            Self::Critical => 20.0,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Low => "LOW",
            Self::Warning => "WARNING",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Score derived purely from issue severities: `100 - Σ penalty`, clamped.
#[must_use]
pub fn penalty_score(issues: &[Issue]) -> f64 {
    let total: f64 = issues.iter().map(|i| i.severity.penalty()).sum();
    clamp_score(MAX_SCORE - total)
}

/// The four scoring dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dimension {
    Visual,
    Animation,
    CognitiveLoad,
    DesignTokens,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Visual,
        Dimension::Animation,
        Dimension::CognitiveLoad,
        Dimension::DesignTokens,
    ];

    /// Slug used in issue ids and output directory names.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Visual => "visual",
            Self::Animation => "animation",
            Self::CognitiveLoad => "cognitive",
            Self::DesignTokens => "tokens",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Visual => "Visual",
            Self::Animation => "Animation",
            Self::CognitiveLoad => "Cognitive load",
            Self::DesignTokens => "Design tokens",
        }
    }

    /// Parses a slug or the kebab-case name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "visual" => Some(Self::Visual),
            "animation" => Some(Self::Animation),
            "cognitive" | "cognitive-load" => Some(Self::CognitiveLoad),
            "tokens" | "design-tokens" => Some(Self::DesignTokens),
            _ => None,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// A normalized finding. Issues are append-only within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
}

impl Issue {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            severity,
            recommendations: Vec::new(),
            component: None,
            dimension: None,
            token_type: None,
            task_id: None,
            animation: None,
            selector: None,
        }
    }

    #[must_use]
    pub fn recommend(mut self, text: impl Into<String>) -> Self {
        self.recommendations.push(text.into());
        self
    }

    #[must_use]
    pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
        self.token_type = Some(token_type.into());
        self
    }

    #[must_use]
    pub fn with_task(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    #[must_use]
    pub fn with_animation(mut self, animation: impl Into<String>) -> Self {
        self.animation = Some(animation.into());
        self
    }

    #[must_use]
    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    /// The uniform failure issue for an analyzer that could not finish.
    #[must_use]
    pub fn analyzer_failure(dimension: Dimension, message: &str) -> Self {
        Self::new(
            format!("{}-error", dimension.slug()),
            format!("{} analysis failed", dimension.label()),
            message,
            Severity::Error,
        )
        .with_dimension(dimension)
        .recommend("Check that the component sources are readable and well-formed")
    }

    #[must_use]
    pub fn with_dimension(mut self, dimension: Dimension) -> Self {
        self.dimension = Some(dimension);
        self
    }
}

/// What an analyzer computes before the shared bookkeeping is applied.
#[derive(Debug, Clone)]
pub struct Scored<M> {
    pub score: f64,
    pub issues: Vec<Issue>,
    pub metrics: M,
}

/// Output of one analyzer for one component.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult<M> {
    pub component_id: String,
    pub dimension: Dimension,
    pub score: f64,
    pub max_score: f64,
    pub issues: Vec<Issue>,
    /// `None` when the analyzer failed.
    pub metrics: Option<M>,
    pub timestamp: DateTime<Utc>,
    pub duration_ms: u128,
}

impl<M> AnalysisResult<M> {
    /// True when the analyzer hit the failure path.
    #[must_use]
    pub fn failed(&self) -> bool {
        self.metrics.is_none()
    }

    #[must_use]
    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }

    #[must_use]
    pub fn has_severity_at_least(&self, floor: Severity) -> bool {
        self.issues.iter().any(|i| i.severity >= floor)
    }
}
