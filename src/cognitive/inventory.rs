// src/cognitive/inventory.rs
//! Interactive-element inventory.

use crate::markup::{self, Element};
use serde::Serialize;
use std::collections::BTreeSet;

const TEXT_INPUT_TYPES: &[&str] = &[
    "text", "email", "password", "search", "tel", "url", "number",
];
const BUTTON_INPUT_TYPES: &[&str] = &["submit", "button", "reset", "image"];
const ICON_TAGS: &[&str] = &["svg", "img", "i"];

/// Button captions that say nothing about the action.
const VAGUE_CAPTIONS: &[&str] = &[
    "click", "click here", "here", "button", "go", "ok", "more", "link", "this",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControlKind {
    Button,
    TextInput,
    OtherInput,
    Select,
    Checkbox,
    Radio,
    Link,
}

impl ControlKind {
    /// Controls that take a value from the user.
    #[must_use]
    pub const fn is_field(self) -> bool {
        matches!(self, Self::TextInput | Self::OtherInput | Self::Select)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Control {
    pub kind: ControlKind,
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Visible text, or the `value` of an input button.
    pub text: String,
    pub disabled: bool,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aria_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// A `<label>` wraps the control or points at its id.
    pub has_label: bool,
    pub has_icon: bool,
    /// `<option>` count for selects.
    pub option_count: usize,
}

impl Control {
    /// No accessible name beyond visible text: no aria-label, placeholder or label.
    #[must_use]
    pub fn is_unlabeled(&self) -> bool {
        self.kind.is_field() && self.aria_label.is_none() && self.placeholder.is_none() && !self.has_label
    }

    /// Field with neither an aria-label nor a placeholder. A `<label>` does
    /// not exempt it.
    #[must_use]
    pub fn lacks_aria_and_placeholder(&self) -> bool {
        self.kind.is_field() && self.aria_label.is_none() && self.placeholder.is_none()
    }

    /// Icon with no text and no aria-label.
    #[must_use]
    pub fn is_icon_only(&self) -> bool {
        matches!(self.kind, ControlKind::Button | ControlKind::Link)
            && self.has_icon
            && self.text.is_empty()
            && self.aria_label.is_none()
    }

    /// Text button whose caption is missing or vague. Icon-only buttons are
    /// counted separately.
    #[must_use]
    pub fn has_unclear_text(&self) -> bool {
        if self.kind != ControlKind::Button || self.aria_label.is_some() || self.is_icon_only() {
            return false;
        }
        let caption = self.text.trim().to_lowercase();
        caption.chars().count() < 2 || VAGUE_CAPTIONS.contains(&caption.as_str())
    }
}

/// Every interactive control in a document plus the document-level counts
/// the load metrics need.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inventory {
    pub controls: Vec<Control>,
    pub element_count: usize,
    pub word_count: usize,
    pub image_count: usize,
    pub max_depth: usize,
    pub distinct_classes: usize,
    pub inline_styles: usize,
}

impl Inventory {
    #[must_use]
    pub fn of_kind(&self, kind: ControlKind) -> impl Iterator<Item = &Control> {
        self.controls.iter().filter(move |c| c.kind == kind)
    }

    #[must_use]
    pub fn count(&self, kind: ControlKind) -> usize {
        self.of_kind(kind).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    /// Checkbox and radio groups keyed by `name`; unnamed boxes stand alone.
    #[must_use]
    pub fn choice_groups(&self) -> usize {
        let mut named = BTreeSet::new();
        let mut unnamed = 0;
        for c in self
            .controls
            .iter()
            .filter(|c| matches!(c.kind, ControlKind::Checkbox | ControlKind::Radio))
        {
            match &c.name {
                Some(name) => {
                    named.insert(name.as_str());
                }
                None => unnamed += 1,
            }
        }
        named.len() + unnamed
    }
}

/// Scans markup for interactive controls.
#[must_use]
pub fn scan(markup_text: &str) -> Inventory {
    let elements = markup::parse(markup_text);
    let label_targets: BTreeSet<&str> = elements
        .iter()
        .filter(|e| e.tag == "label")
        .filter_map(|e| e.non_empty_attr("for"))
        .collect();

    let controls = elements
        .iter()
        .filter_map(|e| {
            let kind = classify(e)?;
            Some(control(&elements, e, kind, &label_targets))
        })
        .collect();

    let classes: BTreeSet<&str> = elements.iter().flat_map(Element::classes).collect();

    Inventory {
        controls,
        element_count: elements.len(),
        word_count: markup::text_content(markup_text).split_whitespace().count(),
        image_count: elements.iter().filter(|e| is_imagery(e)).count(),
        max_depth: markup::max_depth(&elements),
        distinct_classes: classes.len(),
        inline_styles: elements.iter().filter(|e| e.inline_style().is_some()).count(),
    }
}

fn classify(e: &Element) -> Option<ControlKind> {
    match e.tag.as_str() {
        "button" => Some(ControlKind::Button),
        "select" => Some(ControlKind::Select),
        "textarea" => Some(ControlKind::TextInput),
        "a" if e.has_attr("href") => Some(ControlKind::Link),
        "input" => {
            let ty = e.input_type().unwrap_or_else(|| "text".to_string());
            match ty.as_str() {
                "hidden" => None,
                "checkbox" => Some(ControlKind::Checkbox),
                "radio" => Some(ControlKind::Radio),
                t if BUTTON_INPUT_TYPES.contains(&t) => Some(ControlKind::Button),
                t if TEXT_INPUT_TYPES.contains(&t) => Some(ControlKind::TextInput),
                _ => Some(ControlKind::OtherInput),
            }
        }
        _ if e.attr("role") == Some("button") => Some(ControlKind::Button),
        _ => None,
    }
}

fn control(elements: &[Element], e: &Element, kind: ControlKind, label_targets: &BTreeSet<&str>) -> Control {
    let text = if e.tag == "input" {
        e.non_empty_attr("value").unwrap_or_default().to_string()
    } else {
        e.text.clone()
    };

    let labelled_by_for = e.non_empty_attr("id").is_some_and(|id| label_targets.contains(id));
    let wrapped = elements
        .iter()
        .filter(|l| l.tag == "label")
        .any(|l| markup::is_descendant(elements, e.index, l.index));

    let has_icon = markup::descendants(elements, e.index).any(is_imagery)
        || e.classes().iter().any(|c| c.contains("icon"));

    Control {
        kind,
        tag: e.tag.clone(),
        name: e.non_empty_attr("name").map(str::to_string),
        text,
        disabled: e.has_attr("disabled"),
        required: e.has_attr("required"),
        aria_label: e
            .non_empty_attr("aria-label")
            .or_else(|| e.non_empty_attr("aria-labelledby"))
            .map(str::to_string),
        placeholder: e.non_empty_attr("placeholder").map(str::to_string),
        has_label: labelled_by_for || wrapped,
        has_icon,
        option_count: if kind == ControlKind::Select {
            markup::descendants(elements, e.index).filter(|d| d.tag == "option").count()
        } else {
            0
        },
    }
}

fn is_imagery(e: &Element) -> bool {
    ICON_TAGS.contains(&e.tag.as_str()) || e.classes().iter().any(|c| c.contains("icon"))
}
