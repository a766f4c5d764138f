// src/visual/browser.rs
//! The rendering capability and its built-in static implementation.

use super::style::{self, ComputedStyle, Display, Length, Rule};
use super::VisualState;
use crate::error::Result;
use crate::markup::{self, Element};
use image::{Rgba, RgbaImage};
use std::collections::BTreeMap;

/// Tallest screenshot the static renderer paints.
pub const MAX_PAGE_HEIGHT: u32 = 4000;

/// Widest viewport accepted by configuration.
pub const MAX_VIEWPORT_WIDTH: u32 = 7680;

/// Elements nested at or below this depth are not laid out or painted.
pub const MAX_LAYOUT_DEPTH: usize = 256;

const WHITE: [u8; 3] = [255, 255, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// One page to render: component markup and style in an isolated document.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub markup: String,
    pub style: String,
    pub viewport: Viewport,
    pub state: VisualState,
}

/// Layout box of one rendered element, with the attributes the audit reads.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementBox {
    /// Index into the markup's element list; stable across viewports.
    pub index: usize,
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    pub text: String,
    /// Text the element holds directly, outside child elements.
    pub own_text: bool,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Widest extent of the element's content measured from `x`.
    pub content_width: f64,
    pub color: [u8; 3],
    /// Own background, or the nearest painted ancestor's.
    pub background: [u8; 3],
    /// Declared pixel width, if any.
    pub fixed_width: Option<f64>,
}

impl ElementBox {
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str).map(str::trim).filter(|v| !v.is_empty())
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Short description for issue messages: `tag#id.class`.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut out = self.tag.clone();
        if let Some(id) = self.attr("id") {
            out.push('#');
            out.push_str(id);
        }
        if let Some(class) = self.attr("class").and_then(|c| c.split_whitespace().next()) {
            out.push('.');
            out.push_str(class);
        }
        out
    }
}

#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub viewport: Viewport,
    pub screenshot: RgbaImage,
    pub elements: Vec<ElementBox>,
    pub document_height: f64,
    /// Deepest nesting in the markup when it reached [`MAX_LAYOUT_DEPTH`].
    pub depth_limited: Option<usize>,
}

/// Renders a page to a screenshot plus element boxes.
pub trait Browser: Send + Sync {
    /// # Errors
    /// Returns error if the page cannot be rendered.
    fn render(&self, request: &PageRequest) -> Result<RenderedPage>;
}

/// Deterministic renderer: block and inline flow, text wrapping by width, a
/// compound-selector cascade, and backgrounds plus text bars painted to PNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticBrowser;

impl Browser for StaticBrowser {
    fn render(&self, request: &PageRequest) -> Result<RenderedPage> {
        let elements = markup::parse(&request.markup);
        let mut css = markup::embedded_styles(&request.markup);
        css.push('\n');
        css.push_str(&request.style);
        let rules = style::parse_rules(&css);

        let mut layout = Layout::new(&elements, &rules, request.state);
        let width = f64::from(request.viewport.width);
        let roots: Vec<usize> = elements.iter().filter(|e| e.parent.is_none()).map(|e| e.index).collect();
        let document_height = layout.flow(&roots, 0.0, 0.0, width);

        let depth_limited = layout.depth_limited.then(|| markup::max_depth(&elements));
        let boxes: Vec<ElementBox> = layout.boxes.into_iter().flatten().collect();
        let screenshot = paint(&boxes, &layout.styles, request.viewport, document_height);

        Ok(RenderedPage {
            viewport: request.viewport,
            screenshot,
            elements: boxes,
            document_height,
            depth_limited,
        })
    }
}

fn char_width(style: &ComputedStyle) -> f64 {
    style.font_size * 0.55
}

fn line_height(style: &ComputedStyle) -> f64 {
    style.font_size * 1.4
}

/// Intrinsic size of replaced and form elements.
fn intrinsic(el: &Element) -> Option<(f64, f64)> {
    let attr_px = |name: &str| el.attr(name).and_then(|v| v.trim_end_matches("px").parse::<f64>().ok());
    let size = |w: f64, h: f64| Some((attr_px("width").unwrap_or(w), attr_px("height").unwrap_or(h)));
    match el.tag.as_str() {
        "img" => size(150.0, 100.0),
        "svg" => size(24.0, 24.0),
        "video" | "canvas" | "iframe" => size(300.0, 150.0),
        "input" => match el.input_type().as_deref() {
            Some("checkbox" | "radio") => Some((16.0, 16.0)),
            _ => Some((200.0, 32.0)),
        },
        "select" => Some((180.0, 32.0)),
        "textarea" => Some((300.0, 80.0)),
        _ => None,
    }
}

struct Layout<'a> {
    elements: &'a [Element],
    rules: &'a [Rule],
    state: VisualState,
    children: Vec<Vec<usize>>,
    styles: Vec<Option<ComputedStyle>>,
    backgrounds: Vec<[u8; 3]>,
    boxes: Vec<Option<ElementBox>>,
    depth_limited: bool,
}

impl<'a> Layout<'a> {
    fn new(elements: &'a [Element], rules: &'a [Rule], state: VisualState) -> Self {
        let mut children = vec![Vec::new(); elements.len()];
        for el in elements {
            if let Some(p) = el.parent {
                children[p].push(el.index);
            }
        }
        Self {
            elements,
            rules,
            state,
            children,
            styles: vec![None; elements.len()],
            backgrounds: vec![WHITE; elements.len()],
            boxes: vec![None; elements.len()],
            depth_limited: false,
        }
    }

    /// Characters of text the element holds outside its children.
    fn own_chars(&self, index: usize) -> usize {
        let total = self.elements[index].text.chars().count();
        let nested: usize = self.children[index]
            .iter()
            .map(|c| self.elements[*c].text.chars().count())
            .sum();
        total.saturating_sub(nested)
    }

    fn style_of(&mut self, index: usize) -> ComputedStyle {
        if let Some(s) = &self.styles[index] {
            return s.clone();
        }
        let elements = self.elements;
        let el = &elements[index];
        let parent = el.parent.and_then(|p| self.styles[p].clone());
        let mut s = style::compute(el, self.rules, parent.as_ref(), self.state);
        if style::HIDDEN_TAGS.contains(&el.tag.as_str()) {
            s.display = Display::None;
        }
        if s.padding.is_none() && el.tag == "button" {
            s.padding = Some(8.0);
        }
        let background = s
            .background
            .or_else(|| el.parent.map(|p| self.backgrounds[p]))
            .unwrap_or(WHITE);
        self.backgrounds[index] = background;
        self.styles[index] = Some(s.clone());
        s
    }

    /// Lays out `nodes` as a flow inside a content box; returns its height.
    fn flow(&mut self, nodes: &[usize], x: f64, y: f64, width: f64) -> f64 {
        let mut cursor_x = x;
        let mut cursor_y = y;
        let mut line_h: f64 = 0.0;

        for &node in nodes {
            let s = self.style_of(node);
            match s.display {
                Display::None => {}
                Display::Block => {
                    cursor_y += line_h;
                    line_h = 0.0;
                    cursor_x = x;
                    let (_, h) = self.place(node, x, cursor_y, width);
                    cursor_y += h;
                }
                Display::Inline => {
                    let (mut w, mut h) = self.place(node, cursor_x, cursor_y, width);
                    if cursor_x > x && cursor_x + w > x + width {
                        cursor_y += line_h;
                        line_h = 0.0;
                        cursor_x = x;
                        (w, h) = self.place(node, cursor_x, cursor_y, width);
                    }
                    cursor_x += w;
                    line_h = line_h.max(h);
                }
            }
        }
        cursor_y + line_h - y
    }

    /// Places one element at (`x`, `y`) in a container `avail` wide; returns
    /// its outer size.
    fn place(&mut self, index: usize, x: f64, y: f64, avail: f64) -> (f64, f64) {
        let s = self.style_of(index);
        let elements = self.elements;
        let el = &elements[index];
        let margin = s.margin;
        let pad = s.padding.unwrap_or(0.0);
        let bx = x + margin;
        let by = y + margin;
        let inner_avail = (avail - 2.0 * margin).max(0.0);

        let natural = intrinsic(el);
        let chars = self.own_chars(index);
        #[allow(clippy::cast_precision_loss)]
        let text_w = chars as f64 * char_width(&s);
        let longest_word = el
            .text
            .split_whitespace()
            .map(|w| w.chars().count())
            .max()
            .unwrap_or(0);
        #[allow(clippy::cast_precision_loss)]
        let word_w = longest_word as f64 * char_width(&s);

        let declared = s.width.map(|w| w.resolve(avail));
        let mut width = match (declared, s.display, natural) {
            (Some(w), _, _) => w,
            (None, Display::Block, _) => inner_avail,
            (None, _, Some((w, _))) => w,
            (None, _, None) => {
                let children_w = self.children[index]
                    .clone()
                    .iter()
                    .map(|c| self.measure_inline(*c, inner_avail))
                    .sum::<f64>();
                (text_w + children_w + 2.0 * pad).min(inner_avail.max(2.0 * pad))
            }
        };
        if let Some(max) = s.max_width {
            width = width.min(max.resolve(avail));
        }

        let content_w = (width - 2.0 * pad).max(0.0);
        let lines = if chars == 0 {
            0.0
        } else if content_w <= 0.0 {
            1.0
        } else {
            (text_w / content_w).ceil()
        };
        let text_h = lines * line_height(&s);

        // flow and place recurse per level; children past the cap are dropped.
        let kids = if el.depth + 1 >= MAX_LAYOUT_DEPTH && !self.children[index].is_empty() {
            self.depth_limited = true;
            Vec::new()
        } else {
            self.children[index].clone()
        };
        let kids_h = self.flow(&kids, bx + pad, by + pad + text_h, content_w);

        let content_height = text_h + kids_h + 2.0 * pad;
        let height = match s.height {
            Some(Length::Px(h)) => h,
            _ => content_height.max(natural.map_or(0.0, |(_, h)| h)),
        };

        let kids_right = kids
            .iter()
            .filter_map(|k| self.boxes[*k].as_ref())
            .map(|b| b.right() - bx)
            .fold(0.0_f64, f64::max);
        let content_width = kids_right.max(word_w + 2.0 * pad).max(width.min(text_w + 2.0 * pad));

        self.boxes[index] = Some(ElementBox {
            index,
            tag: el.tag.clone(),
            attrs: el.attrs.clone(),
            text: el.text.clone(),
            own_text: chars > 0,
            x: bx,
            y: by,
            width,
            height,
            content_width,
            color: s.color,
            background: self.backgrounds[index],
            fixed_width: match s.width {
                Some(Length::Px(px)) => Some(px),
                _ => None,
            },
        });

        (width + 2.0 * margin, height + 2.0 * margin)
    }

    /// Width an inline child would take, without placing it.
    fn measure_inline(&mut self, index: usize, avail: f64) -> f64 {
        let s = self.style_of(index);
        if s.display == Display::None {
            return 0.0;
        }
        let elements = self.elements;
        let el = &elements[index];
        if let Some(w) = s.width {
            return w.resolve(avail) + 2.0 * s.margin;
        }
        if let Some((w, _)) = intrinsic(el) {
            return w + 2.0 * s.margin;
        }
        #[allow(clippy::cast_precision_loss)]
        let text = el.text.chars().count() as f64 * char_width(&s);
        (text + 2.0 * s.padding.unwrap_or(0.0) + 2.0 * s.margin).min(avail)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn paint(boxes: &[ElementBox], styles: &[Option<ComputedStyle>], viewport: Viewport, document_height: f64) -> RgbaImage {
    let height = (document_height.ceil() as u32).max(viewport.height).clamp(1, MAX_PAGE_HEIGHT);
    let width = viewport.width.max(1);
    let mut img = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));

    for b in boxes {
        let Some(Some(s)) = styles.get(b.index) else { continue };
        if let Some(bg) = s.background {
            fill(&mut img, b.x, b.y, b.width, b.height, bg);
        }
        if !b.own_text {
            continue;
        }
        let pad = s.padding.unwrap_or(0.0);
        let content_w = (b.width - 2.0 * pad).max(1.0);
        #[allow(clippy::cast_precision_loss)]
        let mut remaining = b.text.chars().count() as f64 * char_width(s);
        let lh = line_height(s);
        let mut line_y = b.y + pad;
        while remaining > 0.0 && line_y < f64::from(height) {
            let w = remaining.min(content_w);
            fill(&mut img, b.x + pad, line_y + lh * 0.25, w, lh * 0.5, s.color);
            remaining -= w;
            line_y += lh;
        }
    }
    img
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn fill(img: &mut RgbaImage, x: f64, y: f64, w: f64, h: f64, rgb: [u8; 3]) {
    let x0 = x.max(0.0) as u32;
    let y0 = y.max(0.0) as u32;
    let x1 = ((x + w).max(0.0) as u32).min(img.width());
    let y1 = ((y + h).max(0.0) as u32).min(img.height());
    for py in y0..y1 {
        for px in x0..x1 {
            img.put_pixel(px, py, Rgba([rgb[0], rgb[1], rgb[2], 255]));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(markup: &str, style: &str, width: u32) -> RenderedPage {
        StaticBrowser
            .render(&PageRequest {
                markup: markup.to_string(),
                style: style.to_string(),
                viewport: Viewport { width, height: 600 },
                state: VisualState::Default,
            })
            .unwrap()
    }

    #[test]
    fn blocks_stack_vertically() {
        let page = render("<div style=\"height: 50px\"></div><div style=\"height: 30px\"></div>", "", 800);
        assert_eq!(page.elements.len(), 2);
        assert!(page.elements[1].y >= 50.0);
        assert!((page.elements[0].width - 800.0).abs() < f64::EPSILON);
        assert!((page.document_height - 80.0).abs() < 1e-9);
    }

    #[test]
    fn fixed_width_overflows_narrow_viewport() {
        let page = render("<div class=\"wide\">x</div>", ".wide { width: 600px; }", 375);
        let b = &page.elements[0];
        assert_eq!(b.fixed_width, Some(600.0));
        assert!(b.right() > 375.0);
    }

    #[test]
    fn text_wraps_with_width() {
        let text = "word ".repeat(60);
        let wide = render(&format!("<p>{text}</p><div style=\"height:10px\"></div>"), "", 1280);
        let narrow = render(&format!("<p>{text}</p><div style=\"height:10px\"></div>"), "", 375);
        assert!(narrow.elements[0].height > wide.elements[0].height);
        assert!(narrow.elements[1].y > wide.elements[1].y);
    }

    #[test]
    fn hidden_tags_are_not_laid_out() {
        let page = render("<style>.a{}</style><script>x()</script><div class=\"a\">hi</div>", "", 800);
        let tags: Vec<&str> = page.elements.iter().map(|b| b.tag.as_str()).collect();
        assert_eq!(tags, vec!["div"]);
    }

    #[test]
    fn screenshot_paints_backgrounds() {
        let page = render("<div style=\"height: 20px; background: #ff0000\"></div>", "", 100);
        assert_eq!(page.screenshot.width(), 100);
        assert_eq!(page.screenshot.get_pixel(5, 5), &Rgba([255, 0, 0, 255]));
        assert_eq!(page.screenshot.get_pixel(5, 50), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn deep_nesting_stops_at_the_layout_cap() {
        let markup = "<div>".repeat(10_000);
        let page = render(&markup, "", 800);
        assert_eq!(page.elements.len(), MAX_LAYOUT_DEPTH);
        assert_eq!(page.depth_limited, Some(10_000));
        assert!(render("<div><p>x</p></div>", "", 800).depth_limited.is_none());
    }

    #[test]
    fn backgrounds_inherit_for_contrast() {
        let page = render("<div style=\"background: white\"><span style=\"color: white\">x</span></div>", "", 400);
        let span = page.elements.iter().find(|b| b.tag == "span").unwrap();
        assert_eq!(span.color, [255, 255, 255]);
        assert_eq!(span.background, [255, 255, 255]);
    }
}
