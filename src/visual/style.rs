// src/visual/style.rs
//! A small cascade: rule parsing, compound-selector matching and the computed
//! properties the static renderer lays out with.

use super::VisualState;
use crate::markup::Element;
use crate::tokens::color;
use crate::tokens::extract::{declarations, Declaration};
use regex::Regex;
use std::sync::LazyLock;

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\*[\s\S]*?\*/").unwrap_or_else(|_| panic!("Invalid Regex")));

static KEYFRAMES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@(?:-webkit-)?keyframes\s+[\w-]+\s*\{(?:[^{}]*\{[^{}]*\})*[^{}]*\}")
        .unwrap_or_else(|_| panic!("Invalid Regex"))
});

static RULE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^{}]+)\{([^{}]*)\}").unwrap_or_else(|_| panic!("Invalid Regex")));

static COMPOUND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z][\w-]*|\*)?((?:[.#][\w-]+)*)(?::(hover|active|focus|focus-visible|focus-within))?$")
        .unwrap_or_else(|_| panic!("Invalid Regex"))
});

static LENGTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-?\d*\.?\d+)(px|%|rem|em)?$").unwrap_or_else(|_| panic!("Invalid Regex"))
});

pub const DEFAULT_FONT_PX: f64 = 16.0;

const BLOCK_TAGS: &[&str] = &[
    "html", "body", "div", "section", "article", "main", "header", "footer", "nav", "aside",
    "form", "fieldset", "p", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "table",
    "tr", "figure", "dialog", "details", "summary", "blockquote", "pre", "hr",
];

/// Tags never rendered.
pub const HIDDEN_TAGS: &[&str] = &["head", "script", "style", "meta", "link", "title", "template", "noscript"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Px(f64),
    Percent(f64),
}

impl Length {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let caps = LENGTH_RE.captures(value.trim())?;
        let n: f64 = caps.get(1)?.as_str().parse().ok()?;
        match caps.get(2).map(|m| m.as_str()) {
            Some("%") => Some(Self::Percent(n)),
            Some("em" | "rem") => Some(Self::Px(n * DEFAULT_FONT_PX)),
            Some("px") => Some(Self::Px(n)),
            _ if n == 0.0 => Some(Self::Px(0.0)),
            _ => None,
        }
    }

    #[must_use]
    pub fn resolve(self, container: f64) -> f64 {
        match self {
            Self::Px(px) => px,
            Self::Percent(p) => container * p / 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    Block,
    Inline,
    None,
}

/// The properties layout and painting read.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    pub display: Display,
    pub width: Option<Length>,
    pub height: Option<Length>,
    pub max_width: Option<Length>,
    pub padding: Option<f64>,
    pub margin: f64,
    pub color: [u8; 3],
    pub background: Option<[u8; 3]>,
    pub font_size: f64,
}

impl ComputedStyle {
    /// Initial values for `tag`, inheriting color and font size from `parent`.
    #[must_use]
    pub fn initial(tag: &str, parent: Option<&ComputedStyle>) -> Self {
        Self {
            display: if BLOCK_TAGS.contains(&tag) { Display::Block } else { Display::Inline },
            width: None,
            height: None,
            max_width: None,
            padding: None,
            margin: 0.0,
            color: parent.map_or([0, 0, 0], |p| p.color),
            background: None,
            font_size: parent.map_or(DEFAULT_FONT_PX, |p| p.font_size),
        }
    }

    pub fn apply(&mut self, decl: &Declaration) {
        let value = decl.value.trim();
        match decl.property.as_str() {
            "display" => {
                self.display = match value {
                    "none" => Display::None,
                    "inline" | "inline-block" | "inline-flex" => Display::Inline,
                    _ => Display::Block,
                };
            }
            "width" => self.width = Length::parse(value),
            "height" => self.height = Length::parse(value),
            "max-width" => self.max_width = Length::parse(value),
            "padding" => self.padding = first_px(value),
            "margin" => self.margin = first_px(value).unwrap_or(0.0),
            "color" => {
                if let Some(c) = color::parse(value) {
                    self.color = to_bytes(c);
                }
            }
            "background" | "background-color" => {
                if value == "transparent" || value == "none" {
                    self.background = None;
                } else if let Some(c) = color::find_colors(value).first().and_then(|c| color::parse(c)) {
                    self.background = Some(to_bytes(c));
                }
            }
            "font-size" => {
                if let Some(Length::Px(px)) = Length::parse(value) {
                    self.font_size = px;
                }
            }
            _ => {}
        }
    }
}

fn first_px(value: &str) -> Option<f64> {
    value.split_whitespace().find_map(|part| match Length::parse(part)? {
        Length::Px(px) => Some(px),
        Length::Percent(_) => None,
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_bytes(c: color::Rgb) -> [u8; 3] {
    [c.r.clamp(0.0, 255.0) as u8, c.g.clamp(0.0, 255.0) as u8, c.b.clamp(0.0, 255.0) as u8]
}

/// One compound selector. Descendant selectors keep only their last compound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub state: Option<VisualState>,
}

impl Selector {
    /// `None` for selectors the cascade cannot evaluate.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let last = text
            .split(|c: char| c.is_whitespace() || c == '>' || c == '+' || c == '~')
            .filter(|s| !s.is_empty())
            .last()?;
        let caps = COMPOUND_RE.captures(last)?;

        let tag = caps
            .get(1)
            .map(|m| m.as_str().to_ascii_lowercase())
            .filter(|t| t != "*");
        let mut id = None;
        let mut classes = Vec::new();
        if let Some(parts) = caps.get(2) {
            for part in split_parts(parts.as_str()) {
                if let Some(c) = part.strip_prefix('.') {
                    classes.push(c.to_string());
                } else if let Some(i) = part.strip_prefix('#') {
                    id = Some(i.to_string());
                }
            }
        }
        let state = caps.get(3).map(|m| match m.as_str() {
            "hover" => VisualState::Hover,
            "active" => VisualState::Active,
            _ => VisualState::Focus,
        });

        if tag.is_none() && id.is_none() && classes.is_empty() && caps.get(1).is_none() {
            return None;
        }
        Some(Self { tag, id, classes, state })
    }

    /// (ids, classes + pseudo-classes, tags).
    #[must_use]
    pub fn specificity(&self) -> (usize, usize, usize) {
        (
            usize::from(self.id.is_some()),
            self.classes.len() + usize::from(self.state.is_some()),
            usize::from(self.tag.is_some()),
        )
    }

    #[must_use]
    pub fn matches(&self, el: &Element, state: VisualState) -> bool {
        if let Some(required) = self.state {
            if required != state {
                return false;
            }
        }
        if self.tag.as_deref().is_some_and(|t| t != el.tag) {
            return false;
        }
        if self.id.as_deref().is_some_and(|i| el.attr("id") != Some(i)) {
            return false;
        }
        let own = el.classes();
        self.classes.iter().all(|c| own.contains(&c.as_str()))
    }
}

/// `.a.b#c` into `[".a", ".b", "#c"]`.
fn split_parts(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for (i, ch) in text.char_indices().skip(1) {
        if ch == '.' || ch == '#' {
            parts.push(&text[start..i]);
            start = i;
        }
    }
    if start < text.len() {
        parts.push(&text[start..]);
    }
    parts
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub selectors: Vec<Selector>,
    pub declarations: Vec<Declaration>,
    pub order: usize,
}

/// Rules in source order. Keyframes and unsupported selectors are dropped.
#[must_use]
pub fn parse_rules(css: &str) -> Vec<Rule> {
    let cleaned = COMMENT_RE.replace_all(css, " ");
    let cleaned = KEYFRAMES_RE.replace_all(&cleaned, " ");
    RULE_RE
        .captures_iter(&cleaned)
        .enumerate()
        .filter_map(|(order, caps)| {
            let selectors: Vec<Selector> = caps
                .get(1)?
                .as_str()
                .split(',')
                .filter_map(Selector::parse)
                .collect();
            if selectors.is_empty() {
                return None;
            }
            Some(Rule {
                selectors,
                declarations: declarations(caps.get(2)?.as_str()),
                order,
            })
        })
        .collect()
}

/// Cascades `rules` and the inline style onto `el`.
#[must_use]
pub fn compute(el: &Element, rules: &[Rule], parent: Option<&ComputedStyle>, state: VisualState) -> ComputedStyle {
    let mut style = ComputedStyle::initial(&el.tag, parent);

    let mut matched: Vec<((usize, usize, usize), usize, &Rule)> = rules
        .iter()
        .filter_map(|rule| {
            rule.selectors
                .iter()
                .filter(|s| s.matches(el, state))
                .map(Selector::specificity)
                .max()
                .map(|spec| (spec, rule.order, rule))
        })
        .collect();
    matched.sort_by_key(|(spec, order, _)| (*spec, *order));

    for (_, _, rule) in matched {
        for decl in &rule.declarations {
            style.apply(decl);
        }
    }
    if let Some(inline) = el.inline_style() {
        for decl in declarations(inline) {
            style.apply(&decl);
        }
    }
    style
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse;

    #[test]
    fn compound_selectors_parse() {
        let s = Selector::parse("nav > a.link.primary:hover").unwrap();
        assert_eq!(s.tag.as_deref(), Some("a"));
        assert_eq!(s.classes, vec!["link", "primary"]);
        assert_eq!(s.state, Some(VisualState::Hover));
        assert_eq!(s.specificity(), (0, 3, 1));
        assert!(Selector::parse("li:nth-child(2)").is_none());
        assert!(Selector::parse("#main").unwrap().id.is_some());
    }

    #[test]
    fn lengths() {
        assert_eq!(Length::parse("600px"), Some(Length::Px(600.0)));
        assert_eq!(Length::parse("50%"), Some(Length::Percent(50.0)));
        assert_eq!(Length::parse("2rem"), Some(Length::Px(32.0)));
        assert_eq!(Length::parse("auto"), None);
    }

    #[test]
    fn cascade_orders_by_specificity_then_source() {
        let rules = parse_rules(".btn { color: #ff0000; } button { color: #00ff00; } .btn { width: 10px; }");
        let els = parse("<button class=\"btn\" style=\"width: 20px\">Go</button>");
        let s = compute(&els[0], &rules, None, VisualState::Default);
        assert_eq!(s.color, [255, 0, 0]);
        assert_eq!(s.width, Some(Length::Px(20.0)));
    }

    #[test]
    fn pseudo_rules_follow_state() {
        let rules = parse_rules(".btn { background: #ffffff; } .btn:hover { background: #000000; }");
        let els = parse("<button class=\"btn\">Go</button>");
        assert_eq!(compute(&els[0], &rules, None, VisualState::Default).background, Some([255, 255, 255]));
        assert_eq!(compute(&els[0], &rules, None, VisualState::Hover).background, Some([0, 0, 0]));
    }

    #[test]
    fn color_inherits() {
        let els = parse("<div style=\"color: white\"><p>hi</p></div>");
        let parent = compute(&els[0], &[], None, VisualState::Default);
        let child = compute(&els[1], &[], Some(&parent), VisualState::Default);
        assert_eq!(child.color, [255, 255, 255]);
        assert_eq!(child.display, Display::Block);
    }

    #[test]
    fn keyframes_are_not_rules() {
        let rules = parse_rules("@keyframes spin { from { opacity: 0 } to { opacity: 1 } } .a { color: red; }");
        assert_eq!(rules.len(), 1);
    }
}
