// src/cognitive/metrics.rs
//! Load metrics, sub-scores and issue thresholds.

use super::inventory::Inventory;
use super::tasks::{Task, TaskComplexity};
use super::CognitiveMetrics;
use crate::config::CognitiveConfig;
use crate::types::{clamp_score, Issue, Severity};

/// Mental-model match when there is nothing to judge.
pub const UNVERIFIED_MENTAL_MODEL: f64 = 95.0;

/// Score for a component without interactive elements.
pub const UNVERIFIED_SCORE: f64 = 90.0;

/// Words, controls and imagery per tag, scaled to 0..100.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn information_density(inv: &Inventory) -> f64 {
    let tags = inv.element_count.max(1) as f64;
    let weighted = inv.word_count as f64 * 0.5 + inv.controls.len() as f64 * 3.0 + inv.image_count as f64 * 2.0;
    (weighted / tags * 10.0).min(100.0)
}

/// Steps, mental operators and high-complexity tasks, on a 0..5 scale.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn interaction_complexity(tasks: &[Task]) -> f64 {
    let steps: usize = tasks.iter().map(|t| t.steps.len()).sum();
    let mental: usize = tasks.iter().map(Task::mental_operators).sum();
    let high = high_tasks(tasks) as f64;
    (steps as f64 * 0.1 + mental as f64 * 0.15 + high).min(5.0)
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn visual_clutter(inv: &Inventory) -> f64 {
    let raw = inv.element_count as f64 * 0.5
        + inv.max_depth as f64 * 3.0
        + inv.distinct_classes as f64
        + inv.inline_styles as f64 * 2.0;
    raw.min(100.0)
}

#[must_use]
pub fn high_tasks(tasks: &[Task]) -> usize {
    tasks.iter().filter(|t| t.complexity == TaskComplexity::High).count()
}

/// 100 minus penalties for controls a user cannot identify.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mental_model_match(inv: &Inventory, tasks: &[Task]) -> f64 {
    if inv.is_empty() {
        return UNVERIFIED_MENTAL_MODEL;
    }
    let unlabeled = inv.controls.iter().filter(|c| c.is_unlabeled()).count() as f64;
    let unclear = inv.controls.iter().filter(|c| c.has_unclear_text()).count() as f64;
    let icon_only = inv.controls.iter().filter(|c| c.is_icon_only()).count() as f64;
    let high = high_tasks(tasks) as f64;
    clamp_score(100.0 - 12.0 * unlabeled - 10.0 * unclear - 15.0 * icon_only - 10.0 * high)
}

/// Fills the sub-scores from the raw metrics.
pub fn apply_scores(m: &mut CognitiveMetrics) {
    m.time_score = clamp_score(100.0 - 2.0 * m.total_time_ms / 1000.0);
    m.density_score = clamp_score(100.0 - m.information_density);
    m.complexity_score = clamp_score(100.0 - 20.0 * m.interaction_complexity);
    m.clutter_score = clamp_score(100.0 - m.visual_clutter);
}

#[must_use]
pub fn overall(m: &CognitiveMetrics) -> f64 {
    clamp_score(
        0.25 * m.time_score
            + 0.20 * m.density_score
            + 0.20 * m.complexity_score
            + 0.15 * m.clutter_score
            + 0.20 * m.mental_model_match,
    )
}

/// Emits cognitive-load issues in a fixed order.
#[must_use]
pub fn issues(m: &CognitiveMetrics, inv: &Inventory, config: &CognitiveConfig) -> Vec<Issue> {
    let mut out = Vec::new();

    for task in m.tasks.iter().filter(|t| t.time_estimate > config.long_task_ms) {
        out.push(
            Issue::new(
                format!("cognitive-long-task-{}", task.id),
                "Task takes too long",
                format!(
                    "\"{}\" is estimated at {:.1}s over {} steps",
                    task.name,
                    task.time_estimate / 1000.0,
                    task.steps.len()
                ),
                Severity::Medium,
            )
            .with_task(task.id.clone())
            .recommend("Remove optional fields or split the task into stages")
            .recommend("Pre-fill values the system already knows"),
        );
    }

    if m.interaction_complexity > 3.0 {
        out.push(
            Issue::new(
                "cognitive-interaction-complexity",
                "High interaction complexity",
                format!("Interaction complexity is {:.1} of 5", m.interaction_complexity),
                Severity::High,
            )
            .recommend("Reduce the number of decisions each task requires"),
        );
    }

    if m.information_density > 70.0 {
        out.push(
            Issue::new(
                "cognitive-information-density",
                "Dense information",
                format!("Information density is {:.0}/100", m.information_density),
                Severity::Medium,
            )
            .recommend("Group related content and use progressive disclosure"),
        );
    }

    if m.visual_clutter > 60.0 {
        out.push(
            Issue::new(
                "cognitive-visual-clutter",
                "Visual clutter",
                format!(
                    "Clutter is {:.0}/100 ({} elements, depth {})",
                    m.visual_clutter, inv.element_count, inv.max_depth
                ),
                Severity::Medium,
            )
            .recommend("Flatten nesting and remove decorative wrappers")
            .recommend("Move inline styles into shared classes"),
        );
    }

    if m.mental_model_match < 70.0 {
        out.push(
            Issue::new(
                "cognitive-mental-model",
                "Controls do not match user expectations",
                format!("Mental-model match is {:.0}/100", m.mental_model_match),
                Severity::High,
            )
            .recommend("Give every control a visible, specific label"),
        );
    }

    let missing: Vec<&str> = inv
        .controls
        .iter()
        .filter(|c| c.lacks_aria_and_placeholder())
        .map(|c| c.tag.as_str())
        .collect();
    if !missing.is_empty() {
        out.push(
            Issue::new(
                "cognitive-missing-labels",
                "Missing input labels",
                format!(
                    "{} form control(s) have neither an aria-label nor a placeholder: {}",
                    missing.len(),
                    missing.join(", ")
                ),
                Severity::High,
            )
            .recommend("Associate a <label> with each input")
            .recommend("Add aria-label where a visible label is not possible"),
        );
    }

    out
}
