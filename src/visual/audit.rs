// src/visual/audit.rs
//! Rules evaluated over rendered element boxes.

use super::browser::{ElementBox, RenderedPage};
use std::collections::BTreeSet;

const WHITE: [u8; 3] = [255, 255, 255];
const BLACK: [u8; 3] = [0, 0, 0];

/// Offending elements per rule, described as `tag#id.class`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Findings {
    pub missing_alt: Vec<String>,
    pub empty_buttons: Vec<String>,
    pub low_contrast: Vec<String>,
    pub overflowing: Vec<String>,
    pub fixed_width: Vec<String>,
}

impl Findings {
    /// Elements failing an accessibility rule.
    #[must_use]
    pub fn accessibility_violations(&self) -> usize {
        self.missing_alt.len() + self.empty_buttons.len() + self.low_contrast.len()
    }
}

#[must_use]
pub fn missing_alt(b: &ElementBox) -> bool {
    b.tag == "img" && !b.attrs.contains_key("alt")
}

#[must_use]
pub fn empty_button(b: &ElementBox) -> bool {
    let is_button = b.tag == "button"
        || (b.tag == "input" && matches!(b.attr("type"), Some("button" | "submit" | "reset")) && b.attr("value").is_none());
    is_button
        && b.text.trim().is_empty()
        && b.attr("aria-label").is_none()
        && b.attr("aria-labelledby").is_none()
        && b.attr("title").is_none()
}

/// Text painted in exactly its background color, white or black.
#[must_use]
pub fn invisible_text(b: &ElementBox) -> bool {
    b.own_text && b.color == b.background && (b.color == WHITE || b.color == BLACK)
}

/// Content spills out of the box, or the box spills out of the viewport.
#[must_use]
pub fn overflows(b: &ElementBox, viewport_width: f64) -> bool {
    const SLACK: f64 = 0.5;
    b.content_width > b.width + SLACK || b.right() > viewport_width + SLACK
}

#[must_use]
pub fn fixed_wider_than(b: &ElementBox, limit: f64) -> bool {
    b.fixed_width.is_some_and(|w| w > limit)
}

/// Runs every rule. Accessibility and fixed-width rules read the first page;
/// overflow is the union across all pages.
#[must_use]
pub fn audit(pages: &[RenderedPage], fixed_width_limit: f64) -> Findings {
    let Some(first) = pages.first() else {
        return Findings::default();
    };
    let pick = |rule: fn(&ElementBox) -> bool| -> Vec<String> {
        first.elements.iter().filter(|b| rule(b)).map(ElementBox::describe).collect()
    };

    let mut overflow_idx = BTreeSet::new();
    for page in pages {
        let width = f64::from(page.viewport.width);
        overflow_idx.extend(page.elements.iter().filter(|b| overflows(b, width)).map(|b| b.index));
    }

    Findings {
        missing_alt: pick(missing_alt),
        empty_buttons: pick(empty_button),
        low_contrast: pick(invisible_text),
        overflowing: first
            .elements
            .iter()
            .filter(|b| overflow_idx.contains(&b.index))
            .map(ElementBox::describe)
            .collect(),
        fixed_width: first
            .elements
            .iter()
            .filter(|b| fixed_wider_than(b, fixed_width_limit))
            .map(ElementBox::describe)
            .collect(),
    }
}

/// Elements whose vertical position moves more than `threshold_px` between
/// two renders. Each Y is taken relative to its viewport height, and the
/// difference is scaled back to pixels of the first viewport.
#[must_use]
pub fn layout_shifts(a: &RenderedPage, b: &RenderedPage, threshold_px: f64) -> usize {
    if a.viewport.height == 0 || b.viewport.height == 0 {
        return 0;
    }
    let (ha, hb) = (f64::from(a.viewport.height), f64::from(b.viewport.height));
    a.elements
        .iter()
        .filter_map(|ea| {
            let eb = b.elements.iter().find(|e| e.index == ea.index)?;
            Some(shift_px(ea.y, ha, eb.y, hb) > threshold_px)
        })
        .filter(|moved| *moved)
        .count()
}

/// `|y_a / h_a - y_b / h_b| * h_a`.
#[must_use]
pub fn shift_px(y_a: f64, h_a: f64, y_b: f64, h_b: f64) -> f64 {
    (y_a / h_a - y_b / h_b).abs() * h_a
}

/// Shifts summed over adjacent page pairs.
#[must_use]
pub fn total_layout_shifts(pages: &[RenderedPage], threshold_px: f64) -> usize {
    pages.windows(2).map(|w| layout_shifts(&w[0], &w[1], threshold_px)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visual::browser::{Browser, PageRequest, StaticBrowser, Viewport};
    use crate::visual::VisualState;

    fn page(markup: &str, style: &str, width: u32) -> RenderedPage {
        StaticBrowser
            .render(&PageRequest {
                markup: markup.to_string(),
                style: style.to_string(),
                viewport: Viewport { width, height: 800 },
                state: VisualState::Default,
            })
            .unwrap()
    }

    #[test]
    fn accessibility_rules() {
        let p = page(
            r#"<img src="a.png"><img src="b.png" alt=""><button></button><button aria-label="Close"></button><p style="color:#fff">ghost</p>"#,
            "",
            1280,
        );
        let f = audit(&[p], 500.0);
        assert_eq!(f.missing_alt, vec!["img"]);
        assert_eq!(f.empty_buttons, vec!["button"]);
        assert_eq!(f.low_contrast, vec!["p"]);
        assert_eq!(f.accessibility_violations(), 3);
    }

    #[test]
    fn wide_fixed_element_overflows_small_viewport_only() {
        let markup = r#"<div class="hero">Hi</div>"#;
        let css = ".hero { width: 600px; }";
        let pages = vec![page(markup, css, 1280), page(markup, css, 375)];
        let f = audit(&pages, 500.0);
        assert_eq!(f.overflowing, vec!["div.hero"]);
        assert_eq!(f.fixed_width, vec!["div.hero"]);
        assert!(audit(&pages[..1], 500.0).overflowing.is_empty());
    }

    fn moved(y_a: f64, y_b: f64, height_b: u32) -> usize {
        let at = |y: f64, width: u32, height: u32| {
            let mut p = page("<div></div>", "", width);
            p.viewport.height = height;
            p.elements[0].y = y;
            p
        };
        layout_shifts(&at(y_a, 1280, 800), &at(y_b, 768, height_b), 20.0)
    }

    #[test]
    fn shift_is_measured_in_viewport_units() {
        assert!((shift_px(100.0, 800.0, 150.0, 800.0) - 50.0).abs() < 1e-9);
        // 200 of 400 is the same spot as 400 of 800.
        assert!(shift_px(400.0, 800.0, 200.0, 400.0).abs() < 1e-9);
        assert!((shift_px(100.0, 800.0, 100.0, 400.0) - 100.0).abs() < 1e-9);

        assert_eq!(moved(100.0, 150.0, 800), 1);
        assert_eq!(moved(100.0, 115.0, 800), 0);
        assert_eq!(moved(400.0, 200.0, 400), 0);
        assert_eq!(moved(100.0, 100.0, 400), 1);
    }

    #[test]
    fn stacked_blocks_do_not_shift() {
        let markup = r#"<div style="height:100px"></div><div style="height:100px"></div>"#;
        let pages = vec![page(markup, "", 1280), page(markup, "", 768), page(markup, "", 375)];
        assert_eq!(total_layout_shifts(&pages, 20.0), 0);
    }

    #[test]
    fn wrapping_text_shifts_following_blocks() {
        let text = "lorem ipsum ".repeat(80);
        let markup = format!(r#"<div style="height:400px"></div><p>{text}</p><div style="height:400px"></div>"#);
        let pages = vec![page(&markup, "", 1280), page(&markup, "", 375)];
        assert!(total_layout_shifts(&pages, 20.0) > 0);
    }
}
