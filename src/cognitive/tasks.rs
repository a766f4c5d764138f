// src/cognitive/tasks.rs
//! Keystroke-Level Model task synthesis.

use super::inventory::{Control, ControlKind, Inventory};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Primitive operators and their durations in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    /// Keystroke.
    K,
    /// Point with the mouse.
    P,
    /// Mouse button press or release.
    B,
    /// Move hands between mouse and keyboard.
    H,
    /// Mental preparation.
    M,
    /// System response.
    R,
}

impl Operator {
    #[must_use]
    pub const fn millis(self) -> f64 {
        match self {
            Self::K => 280.0,
            Self::P => 1100.0,
            Self::B => 100.0,
            Self::H => 400.0,
            Self::M => 1200.0,
            Self::R => 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskKind {
    FormFill,
    Navigation,
    Action,
}

impl TaskKind {
    pub const ALL: [TaskKind; 3] = [TaskKind::FormFill, TaskKind::Navigation, TaskKind::Action];

    #[must_use]
    pub const fn default_name(self) -> &'static str {
        match self {
            Self::FormFill => "Complete form",
            Self::Navigation => "Navigate",
            Self::Action => "Perform action",
        }
    }

    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::FormFill => "form",
            Self::Navigation => "navigate",
            Self::Action => "action",
        }
    }
}

/// A task request: a bare kind, or a kind with a name and parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskSpec {
    Simple(TaskKind),
    Described {
        name: String,
        kind: TaskKind,
        #[serde(default)]
        component: Option<String>,
        #[serde(default)]
        params: BTreeMap<String, serde_json::Value>,
    },
}

impl From<TaskKind> for TaskSpec {
    fn from(kind: TaskKind) -> Self {
        Self::Simple(kind)
    }
}

/// Most characters typed into one field.
pub const MAX_CHARS_PER_FIELD: usize = 500;

/// The single internal form of a [`TaskSpec`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTask {
    pub name: String,
    pub kind: TaskKind,
    pub component: Option<String>,
    /// Overrides the generated task description.
    pub description: Option<String>,
    /// Characters typed per text field, at most [`MAX_CHARS_PER_FIELD`].
    pub chars_per_field: usize,
}

impl TaskSpec {
    #[must_use]
    pub fn resolve(&self, default_chars: usize) -> ResolvedTask {
        let default_chars = default_chars.min(MAX_CHARS_PER_FIELD);
        match self {
            Self::Simple(kind) => ResolvedTask {
                name: kind.default_name().to_string(),
                kind: *kind,
                component: None,
                description: None,
                chars_per_field: default_chars,
            },
            Self::Described {
                name,
                kind,
                component,
                params,
            } => ResolvedTask {
                name: name.clone(),
                kind: *kind,
                component: component.clone(),
                description: params
                    .get("description")
                    .and_then(serde_json::Value::as_str)
                    .map(str::to_string),
                chars_per_field: params
                    .get("charsPerField")
                    .and_then(serde_json::Value::as_u64)
                    .map_or(default_chars, |n| {
                        usize::try_from(n).unwrap_or(usize::MAX).min(MAX_CHARS_PER_FIELD)
                    }),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepAction {
    Click,
    Type,
    Select,
    Read,
    Submit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStep {
    pub action: StepAction,
    pub target: String,
    /// Every operator of the step, in order.
    #[serde(rename = "mentalOperators")]
    pub operators: Vec<Operator>,
    pub time_estimate: f64,
}

impl TaskStep {
    fn new(action: StepAction, target: impl Into<String>, operators: Vec<Operator>) -> Self {
        let time_estimate = operators.iter().map(|o| o.millis()).sum();
        Self {
            action,
            target: target.into(),
            operators,
            time_estimate,
        }
    }

    #[must_use]
    pub fn mental_operators(&self) -> usize {
        self.operators.iter().filter(|o| **o == Operator::M).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskComplexity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    pub description: String,
    pub kind: TaskKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    pub steps: Vec<TaskStep>,
    /// Sum of step estimates, milliseconds.
    pub time_estimate: f64,
    pub complexity: TaskComplexity,
}

impl Task {
    #[must_use]
    pub fn mental_operators(&self) -> usize {
        self.steps.iter().map(TaskStep::mental_operators).sum()
    }
}

/// Step count or duration above these make a task medium or high complexity.
const MEDIUM_STEPS: usize = 6;
const HIGH_STEPS: usize = 12;
const MEDIUM_MS: f64 = 10_000.0;
const HIGH_MS: f64 = 30_000.0;

fn complexity(steps: usize, time_ms: f64) -> TaskComplexity {
    if steps > HIGH_STEPS || time_ms > HIGH_MS {
        TaskComplexity::High
    } else if steps > MEDIUM_STEPS || time_ms > MEDIUM_MS {
        TaskComplexity::Medium
    } else {
        TaskComplexity::Low
    }
}

fn click() -> Vec<Operator> {
    vec![Operator::M, Operator::P, Operator::B]
}

/// Builds the task for `spec`, or `None` when the inventory has nothing the
/// task could act on.
#[must_use]
pub fn synthesize(inventory: &Inventory, spec: &ResolvedTask, component_id: &str) -> Option<Task> {
    let steps = match spec.kind {
        TaskKind::FormFill => form_steps(inventory, spec.chars_per_field),
        TaskKind::Navigation => navigation_steps(inventory),
        TaskKind::Action => action_steps(inventory),
    };
    if steps.is_empty() {
        return None;
    }

    let time_estimate = steps.iter().map(|s| s.time_estimate).sum();
    let description = spec.description.clone().unwrap_or_else(|| describe(spec.kind, &steps));
    Some(Task {
        id: format!("{}-{}", spec.kind.slug(), component_id),
        name: spec.name.clone(),
        description,
        kind: spec.kind,
        component: spec.component.clone().or_else(|| Some(component_id.to_string())),
        complexity: complexity(steps.len(), time_estimate),
        time_estimate,
        steps,
    })
}

fn describe(kind: TaskKind, steps: &[TaskStep]) -> String {
    let target = |action: StepAction| {
        steps
            .iter()
            .rev()
            .find(|s| s.action == action)
            .map_or_else(String::new, |s| s.target.clone())
    };
    match kind {
        TaskKind::FormFill => {
            let fields = steps
                .iter()
                .filter(|s| matches!(s.action, StepAction::Type | StepAction::Select))
                .count();
            format!("Fill in {fields} field(s) and submit with \"{}\"", target(StepAction::Submit))
        }
        TaskKind::Navigation => format!("Scan the links and follow \"{}\"", target(StepAction::Click)),
        TaskKind::Action => format!("Find and press \"{}\"", target(StepAction::Click)),
    }
}

fn field_name(control: &Control, fallback: &str, n: usize) -> String {
    control
        .aria_label
        .clone()
        .or_else(|| control.placeholder.clone())
        .or_else(|| control.name.clone())
        .unwrap_or_else(|| format!("{fallback} {n}"))
}

/// Click and type per text field, click and choose per dropdown, read and
/// click per choice group, then submit. Empty without text fields.
fn form_steps(inventory: &Inventory, chars: usize) -> Vec<TaskStep> {
    let text_fields: Vec<_> = inventory.of_kind(ControlKind::TextInput).filter(|c| !c.disabled).collect();
    if text_fields.is_empty() {
        return Vec::new();
    }

    let mut steps = Vec::new();
    for (n, field) in text_fields.iter().enumerate() {
        let target = field_name(field, "field", n + 1);
        steps.push(TaskStep::new(StepAction::Click, target.clone(), click()));
        let mut typing = vec![Operator::H];
        typing.extend(std::iter::repeat(Operator::K).take(chars));
        steps.push(TaskStep::new(StepAction::Type, target, typing));
    }

    for (n, select) in inventory.of_kind(ControlKind::Select).filter(|c| !c.disabled).enumerate() {
        let target = field_name(select, "dropdown", n + 1);
        steps.push(TaskStep::new(StepAction::Click, target.clone(), click()));
        steps.push(TaskStep::new(StepAction::Select, target, click()));
    }

    for n in 0..inventory.choice_groups() {
        let target = format!("option group {}", n + 1);
        steps.push(TaskStep::new(StepAction::Read, target.clone(), vec![Operator::M]));
        steps.push(TaskStep::new(StepAction::Click, target, click()));
    }

    let submit = inventory
        .of_kind(ControlKind::Button)
        .map(|b| b.text.clone())
        .find(|t| !t.is_empty())
        .unwrap_or_else(|| "submit".to_string());
    let mut submit_ops = click();
    submit_ops.push(Operator::R);
    steps.push(TaskStep::new(StepAction::Submit, submit, submit_ops));
    steps
}

/// Scan the links, pick one, wait for the page.
fn navigation_steps(inventory: &Inventory) -> Vec<TaskStep> {
    let Some(link) = inventory.of_kind(ControlKind::Link).next() else {
        return Vec::new();
    };
    let target = if link.text.is_empty() { "link".to_string() } else { link.text.clone() };
    let mut ops = click();
    ops.push(Operator::R);
    vec![
        TaskStep::new(StepAction::Read, "links", vec![Operator::M]),
        TaskStep::new(StepAction::Click, target, ops),
    ]
}

/// Find the primary enabled button and press it.
fn action_steps(inventory: &Inventory) -> Vec<TaskStep> {
    let Some(button) = inventory.of_kind(ControlKind::Button).find(|b| !b.disabled) else {
        return Vec::new();
    };
    let target = button
        .aria_label
        .clone()
        .filter(|_| button.text.is_empty())
        .unwrap_or_else(|| button.text.clone());
    let mut ops = click();
    ops.push(Operator::R);
    vec![
        TaskStep::new(StepAction::Read, "buttons", vec![Operator::M]),
        TaskStep::new(StepAction::Click, target, ops),
    ]
}
