// src/cognitive/mod.rs
//! Cognitive Load Simulator.
//!
//! Builds an inventory of interactive controls, synthesizes user tasks with
//! Keystroke-Level Model timings, and scores time, density, interaction
//! complexity, clutter and how well the controls explain themselves.

pub mod inventory;
pub mod metrics;
pub mod tasks;

pub use inventory::{Control, ControlKind, Inventory};
pub use tasks::{ResolvedTask, Task, TaskKind, TaskSpec};

use crate::analyzer::{load_optional, Analyzer};
use crate::artifact::ComponentArtifact;
use crate::config::CognitiveConfig;
use crate::error::Result;
use crate::types::{Dimension, Scored};
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CognitiveMetrics {
    pub interactive_elements: usize,
    pub task_count: usize,
    pub total_time_ms: f64,
    pub information_density: f64,
    pub interaction_complexity: f64,
    pub visual_clutter: f64,
    pub mental_model_match: f64,
    pub time_score: f64,
    pub density_score: f64,
    pub complexity_score: f64,
    pub clutter_score: f64,
    pub tasks: Vec<Task>,
}

/// The Cognitive Load Simulator. Stateless after construction.
#[derive(Debug, Clone, Default)]
pub struct CognitiveLoadSimulator {
    config: CognitiveConfig,
    tasks: Vec<TaskSpec>,
}

impl CognitiveLoadSimulator {
    #[must_use]
    pub fn new(config: CognitiveConfig) -> Self {
        Self {
            config,
            tasks: Vec::new(),
        }
    }

    /// Restricts analysis to the given tasks instead of every applicable kind.
    #[must_use]
    pub fn with_tasks(mut self, tasks: Vec<TaskSpec>) -> Self {
        self.tasks = tasks;
        self
    }

    fn resolved(&self) -> Vec<ResolvedTask> {
        let chars = self.config.assumed_chars_per_field;
        if self.tasks.is_empty() {
            TaskKind::ALL.iter().map(|k| TaskSpec::Simple(*k).resolve(chars)).collect()
        } else {
            self.tasks.iter().map(|t| t.resolve(chars)).collect()
        }
    }

    /// Estimated tasks for the markup. Tasks with nothing to act on are dropped.
    #[must_use]
    pub fn estimate_task_time(&self, markup: &str, id: &str) -> Vec<Task> {
        self.tasks_for(&inventory::scan(markup), id)
    }

    fn tasks_for(&self, inv: &Inventory, id: &str) -> Vec<Task> {
        let mut out: Vec<Task> = self
            .resolved()
            .iter()
            .filter_map(|spec| tasks::synthesize(inv, spec, id))
            .collect();
        dedupe_ids(&mut out);
        out
    }

    /// Scores the markup's cognitive load.
    #[must_use]
    pub fn analyze_cognitive_load(&self, markup: &str, id: &str) -> Scored<CognitiveMetrics> {
        let inv = inventory::scan(markup);
        if inv.is_empty() {
            return Scored {
                score: metrics::UNVERIFIED_SCORE,
                issues: Vec::new(),
                metrics: CognitiveMetrics {
                    mental_model_match: metrics::UNVERIFIED_MENTAL_MODEL,
                    information_density: metrics::information_density(&inv),
                    visual_clutter: metrics::visual_clutter(&inv),
                    ..CognitiveMetrics::default()
                },
            };
        }

        let tasks = self.tasks_for(&inv, id);
        let mut m = CognitiveMetrics {
            interactive_elements: inv.controls.len(),
            task_count: tasks.len(),
            total_time_ms: tasks.iter().map(|t| t.time_estimate).sum(),
            information_density: metrics::information_density(&inv),
            interaction_complexity: metrics::interaction_complexity(&tasks),
            visual_clutter: metrics::visual_clutter(&inv),
            mental_model_match: metrics::mental_model_match(&inv, &tasks),
            tasks,
            ..CognitiveMetrics::default()
        };
        metrics::apply_scores(&mut m);

        Scored {
            score: metrics::overall(&m),
            issues: metrics::issues(&m, &inv, &self.config),
            metrics: m,
        }
    }
}

/// Suffixes repeated task ids with their position.
fn dedupe_ids(tasks: &mut [Task]) {
    for i in 1..tasks.len() {
        let (seen, rest) = tasks.split_at_mut(i);
        let task = &mut rest[0];
        if seen.iter().any(|t| t.id == task.id) {
            task.id = format!("{}-{}", task.id, i + 1);
        }
    }
}

impl Analyzer for CognitiveLoadSimulator {
    type Metrics = CognitiveMetrics;

    fn dimension(&self) -> Dimension {
        Dimension::CognitiveLoad
    }

    fn applies_to(&self, artifact: &ComponentArtifact) -> bool {
        artifact.markup.is_some()
    }

    fn evaluate(&self, artifact: &ComponentArtifact) -> Result<Scored<CognitiveMetrics>> {
        let markup = load_optional(artifact.markup.as_ref())?;
        Ok(self.analyze_cognitive_load(markup.as_deref().unwrap_or(""), &artifact.component_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;

    #[test]
    fn nothing_interactive_scores_ninety() {
        let r = CognitiveLoadSimulator::default().analyze_cognitive_load("<div><p>Read me</p></div>", "c");
        assert!((r.score - 90.0).abs() < f64::EPSILON);
        assert!(r.issues.is_empty());
        assert!((r.metrics.mental_model_match - 95.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unlabeled_form_is_flagged() {
        let markup = "<form><input><input><input><button type=\"submit\">Create account</button></form>";
        let r = CognitiveLoadSimulator::default().analyze_cognitive_load(markup, "signup");

        let form = r.metrics.tasks.iter().find(|t| t.kind == TaskKind::FormFill).unwrap();
        assert_eq!(form.name, "Complete form");
        assert!(form.steps.len() >= 5);

        let labels = r.issues.iter().find(|i| i.id == "cognitive-missing-labels").unwrap();
        assert_eq!(labels.severity, Severity::High);
        assert!(labels.description.starts_with('3'));
        assert!(r.metrics.mental_model_match < 70.0);
    }

    #[test]
    fn label_element_does_not_silence_missing_labels() {
        let sim = CognitiveLoadSimulator::default();
        let r = sim.analyze_cognitive_load(r#"<label for="x">Name</label><input id="x">"#, "c");
        let issue = r.issues.iter().find(|i| i.id == "cognitive-missing-labels").unwrap();
        assert_eq!(issue.severity, Severity::High);
        assert!(issue.description.starts_with('1'));

        let named = sim.analyze_cognitive_load(r#"<input aria-label="Name"><select placeholder="Pick"></select>"#, "c");
        assert!(!named.issues.iter().any(|i| i.id == "cognitive-missing-labels"));
    }

    #[test]
    fn only_requested_tasks_are_built() {
        let sim = CognitiveLoadSimulator::default().with_tasks(vec![TaskKind::Action.into()]);
        let tasks = sim.estimate_task_time("<input><a href=\"/\">Home</a><button>Save</button>", "c");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].kind, TaskKind::Action);
    }

    #[test]
    fn repeated_specs_get_distinct_ids() {
        let sim = CognitiveLoadSimulator::default()
            .with_tasks(vec![TaskKind::Action.into(), TaskKind::Action.into()]);
        let tasks = sim.estimate_task_time("<button>Save</button>", "c");
        assert_ne!(tasks[0].id, tasks[1].id);
    }

    #[test]
    fn scores_stay_in_bounds_for_huge_forms() {
        let markup = "<input><select></select><input type=\"checkbox\">".repeat(40);
        let r = CognitiveLoadSimulator::default().analyze_cognitive_load(&markup, "big");
        assert!((0.0..=100.0).contains(&r.score));
        assert!(r.metrics.interaction_complexity <= 5.0);
        assert!(r.issues.iter().any(|i| i.id == "cognitive-interaction-complexity"));
    }
}
