// src/markup.rs
//! Lightweight markup scanner for HTML and JSX-flavoured component source.
//!
//! This is not an HTML parser. It recovers a flat element list with parent
//! links, attributes and inner text, which is all the heuristics need.
//! Unbalanced markup never fails: unmatched closing tags are ignored and
//! unclosed elements are closed at end of input.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"<!--[\s\S]*?-->|</([A-Za-z][\w.:-]*)\s*>|<([A-Za-z][\w.:-]*)((?:[^>"'{]|"[^"]*"|'[^']*'|\{[^}]*\})*?)(/?)>"#,
    )
    .unwrap_or_else(|_| panic!("Invalid Regex"))
});

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_:@][\w:.@-]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|\{([^}]*)\}|([^\s"'>/]+)))?"#)
        .unwrap_or_else(|_| panic!("Invalid Regex"))
});

static STYLE_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<style[^>]*>([\s\S]*?)</style\s*>").unwrap_or_else(|_| panic!("Invalid Regex"))
});

static WS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").unwrap_or_else(|_| panic!("Invalid Regex")));

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

/// One element recovered from markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub index: usize,
    /// Lowercased tag name. Component tags such as `motion.div` keep their dots.
    pub tag: String,
    /// Lowercased attribute names; `className` and `htmlFor` are folded to
    /// `class` and `for`.
    pub attrs: BTreeMap<String, String>,
    /// Number of open ancestors.
    pub depth: usize,
    pub parent: Option<usize>,
    /// Whitespace-collapsed inner text, including descendants.
    pub text: String,
}

impl Element {
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    /// Attribute value, treating an empty or whitespace value as absent.
    #[must_use]
    pub fn non_empty_attr(&self, name: &str) -> Option<&str> {
        self.attr(name).map(str::trim).filter(|v| !v.is_empty())
    }

    #[must_use]
    pub fn classes(&self) -> Vec<&str> {
        self.attr("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn inline_style(&self) -> Option<&str> {
        self.non_empty_attr("style")
    }

    /// `type` attribute, lowercased; `None` when absent.
    #[must_use]
    pub fn input_type(&self) -> Option<String> {
        self.attr("type").map(|t| t.trim().to_ascii_lowercase())
    }
}

/// Scans markup into elements in document order.
#[must_use]
pub fn parse(markup: &str) -> Vec<Element> {
    let mut elements: Vec<Element> = Vec::new();
    let mut stack: Vec<usize> = Vec::new();
    let mut cursor = 0;
    let mut skip_until: Option<String> = None;

    for caps in TAG_RE.captures_iter(markup) {
        let Some(whole) = caps.get(0) else { continue };

        if let Some(raw_tag) = &skip_until {
            let closes_raw = caps
                .get(1)
                .is_some_and(|c| c.as_str().eq_ignore_ascii_case(raw_tag));
            if !closes_raw {
                continue;
            }
            skip_until = None;
            cursor = whole.start();
        }

        append_text(&mut elements, &stack, &markup[cursor..whole.start()]);
        cursor = whole.end();

        if whole.as_str().starts_with("<!--") {
            continue;
        }

        if let Some(close) = caps.get(1) {
            close_tag(&elements, &mut stack, &close.as_str().to_ascii_lowercase());
            continue;
        }

        let Some(name) = caps.get(2) else { continue };
        let tag = name.as_str().to_ascii_lowercase();
        let attrs = parse_attrs(caps.get(3).map_or("", |m| m.as_str()));
        let self_closing = caps.get(4).is_some_and(|m| !m.as_str().is_empty());

        let index = elements.len();
        elements.push(Element {
            index,
            tag: tag.clone(),
            attrs,
            depth: stack.len(),
            parent: stack.last().copied(),
            text: String::new(),
        });

        if self_closing || VOID_TAGS.contains(&tag.as_str()) {
            continue;
        }
        if RAW_TEXT_TAGS.contains(&tag.as_str()) {
            skip_until = Some(tag);
            continue;
        }
        stack.push(index);
    }

    if skip_until.is_none() {
        append_text(&mut elements, &stack, &markup[cursor..]);
    }

    for el in &mut elements {
        el.text = WS_RE.replace_all(el.text.trim(), " ").into_owned();
    }
    elements
}

fn close_tag(elements: &[Element], stack: &mut Vec<usize>, tag: &str) {
    let Some(pos) = stack.iter().rposition(|&i| elements[i].tag == tag) else {
        return;
    };
    stack.truncate(pos);
}

fn append_text(elements: &mut [Element], stack: &[usize], text: &str) {
    if text.trim().is_empty() {
        return;
    }
    for &i in stack {
        let el = &mut elements[i];
        el.text.push(' ');
        el.text.push_str(text);
    }
}

fn parse_attrs(raw: &str) -> BTreeMap<String, String> {
    let mut attrs = BTreeMap::new();
    for caps in ATTR_RE.captures_iter(raw) {
        let Some(name) = caps.get(1) else { continue };
        let value = (2..=5)
            .find_map(|g| caps.get(g))
            .map_or_else(String::new, |m| m.as_str().trim().to_string());
        let key = match name.as_str() {
            "className" => "class".to_string(),
            "htmlFor" => "for".to_string(),
            other => other.to_ascii_lowercase(),
        };
        attrs.entry(key).or_insert(value);
    }
    attrs
}

/// True if `ancestor` is a proper ancestor of `index`.
#[must_use]
pub fn is_descendant(elements: &[Element], index: usize, ancestor: usize) -> bool {
    let mut current = elements.get(index).and_then(|e| e.parent);
    while let Some(p) = current {
        if p == ancestor {
            return true;
        }
        current = elements.get(p).and_then(|e| e.parent);
    }
    false
}

/// Elements nested anywhere below `ancestor`.
pub fn descendants(elements: &[Element], ancestor: usize) -> impl Iterator<Item = &Element> {
    elements
        .iter()
        .skip(ancestor + 1)
        .filter(move |e| is_descendant(elements, e.index, ancestor))
}

/// Deepest nesting level (top-level elements count as 1).
#[must_use]
pub fn max_depth(elements: &[Element]) -> usize {
    elements.iter().map(|e| e.depth + 1).max().unwrap_or(0)
}

/// Visible text of the whole document, tags removed.
#[must_use]
pub fn text_content(markup: &str) -> String {
    let roots: Vec<String> = parse(markup)
        .into_iter()
        .filter(|e| e.parent.is_none())
        .map(|e| e.text)
        .filter(|t| !t.is_empty())
        .collect();
    roots.join(" ")
}

/// Contents of every `<style>` block, joined in document order.
#[must_use]
pub fn embedded_styles(markup: &str) -> String {
    let blocks: Vec<&str> = STYLE_BLOCK_RE
        .captures_iter(markup)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();
    blocks.join("\n")
}
