// src/animation/extract.rs
//! Pure `text -> animations` rules for style sheets and scripts.

use super::{AnimationDescriptor, AnimationType, Complexity};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\*[\s\S]*?\*/").unwrap_or_else(|_| panic!("Invalid Regex")));

static KEYFRAMES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@(?:-webkit-)?keyframes\s+([\w-]+)\s*\{((?:[^{}]*\{[^{}]*\})*[^{}]*)\}")
        .unwrap_or_else(|_| panic!("Invalid Regex"))
});

static RULE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([^{}]+)\{([^{}]*)\}").unwrap_or_else(|_| panic!("Invalid Regex"))
});

static MOTION_DECL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|;)\s*(animation|transition)\s*:\s*([^;]+)")
        .unwrap_or_else(|_| panic!("Invalid Regex"))
});

static PROP_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([a-z-]+)\s*:").unwrap_or_else(|_| panic!("Invalid Regex"))
});

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[\s,])(\d*\.?\d+)(ms|s)\b").unwrap_or_else(|_| panic!("Invalid Regex"))
});

/// Properties the compositor can animate without layout or paint.
pub const GPU_PROPERTIES: &[&str] = &["transform", "opacity"];

/// Properties that force layout on every frame.
const LAYOUT_PROPERTIES: &[&str] = &[
    "width", "height", "top", "left", "right", "bottom", "margin", "padding",
];

const TIMING_KEYWORDS: &[&str] = &[
    "ease", "ease-in", "ease-out", "ease-in-out", "linear", "step-start", "step-end",
    "infinite", "alternate", "alternate-reverse", "reverse", "normal", "forwards",
    "backwards", "both", "none", "running", "paused", "initial", "inherit",
];

/// Script animation APIs recognised by text pattern.
pub struct ScriptApi {
    pub kind: AnimationType,
    pub pattern: &'static str,
    pub complexity: Complexity,
    pub duration_ms: f64,
    pub gpu_accelerated: bool,
    pub properties: &'static [&'static str],
}

pub const SCRIPT_APIS: &[ScriptApi] = &[
    ScriptApi {
        kind: AnimationType::RequestAnimationFrame,
        pattern: r"\brequestAnimationFrame\s*\(",
        complexity: Complexity::Medium,
        duration_ms: 1000.0,
        gpu_accelerated: false,
        properties: &["custom"],
    },
    ScriptApi {
        kind: AnimationType::WebAnimations,
        pattern: r"\.animate\s*\(",
        complexity: Complexity::Low,
        duration_ms: 300.0,
        gpu_accelerated: true,
        properties: &["transform", "opacity"],
    },
    ScriptApi {
        kind: AnimationType::Gsap,
        pattern: r"\b(?:gsap|TweenMax|TweenLite)\.(?:to|from|fromTo|timeline)\s*\(",
        complexity: Complexity::Medium,
        duration_ms: 500.0,
        gpu_accelerated: true,
        properties: &["transform", "opacity"],
    },
    ScriptApi {
        kind: AnimationType::Anime,
        pattern: r"\banime\s*\(",
        complexity: Complexity::Medium,
        duration_ms: 500.0,
        gpu_accelerated: false,
        properties: &["transform", "opacity", "color"],
    },
    ScriptApi {
        kind: AnimationType::FramerMotion,
        pattern: r"<motion\.[A-Za-z]+",
        complexity: Complexity::Medium,
        duration_ms: 300.0,
        gpu_accelerated: true,
        properties: &["transform", "opacity"],
    },
    ScriptApi {
        kind: AnimationType::Spring,
        pattern: r"\b(?:useSpring|spring)\s*\(",
        complexity: Complexity::Medium,
        duration_ms: 500.0,
        gpu_accelerated: true,
        properties: &["transform"],
    },
    ScriptApi {
        kind: AnimationType::GenericTransition,
        pattern: r"\b(?:transition|useTransition)\s*\(",
        complexity: Complexity::Low,
        duration_ms: 300.0,
        gpu_accelerated: false,
        properties: &["opacity"],
    },
];

static SCRIPT_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    SCRIPT_APIS
        .iter()
        .map(|api| Regex::new(api.pattern).unwrap_or_else(|_| panic!("Invalid Regex")))
        .collect()
});

/// `@keyframes` name to body.
#[must_use]
pub fn keyframes(style: &str) -> BTreeMap<String, String> {
    KEYFRAMES_RE
        .captures_iter(style)
        .filter_map(|c| Some((c.get(1)?.as_str().to_string(), c.get(2)?.as_str().to_string())))
        .collect()
}

/// Distinct property names declared inside a keyframes body.
#[must_use]
pub fn keyframe_properties(body: &str) -> Vec<String> {
    let mut props: Vec<String> = Vec::new();
    for caps in PROP_NAME_RE.captures_iter(body) {
        let Some(name) = caps.get(1) else { continue };
        let name = name.as_str().to_string();
        if !props.contains(&name) {
            props.push(name);
        }
    }
    props
}

/// First `ms`/`s` time in a value, in milliseconds.
#[must_use]
pub fn parse_duration_ms(value: &str) -> Option<f64> {
    let caps = TIME_RE.captures(value)?;
    let n: f64 = caps.get(1)?.as_str().parse().ok()?;
    match caps.get(2)?.as_str() {
        "s" => Some(n * 1000.0),
        _ => Some(n),
    }
}

/// Complexity from the animated properties.
#[must_use]
pub fn css_complexity(properties: &[String]) -> Complexity {
    if properties.iter().any(|p| p == "all") {
        return Complexity::High;
    }
    let base = match properties.len() {
        0..=2 => Complexity::Low,
        3..=4 => Complexity::Medium,
        _ => Complexity::High,
    };
    let triggers_layout = properties
        .iter()
        .any(|p| LAYOUT_PROPERTIES.iter().any(|l| p == l || p.starts_with(&format!("{l}-"))));
    if triggers_layout {
        base.bump()
    } else {
        base
    }
}

#[must_use]
pub fn is_gpu_accelerated(properties: &[String]) -> bool {
    properties.iter().any(|p| GPU_PROPERTIES.contains(&p.as_str()))
}

/// Animations declared in a style sheet.
#[must_use]
pub fn from_style(style: &str, default_duration_ms: f64) -> Vec<AnimationDescriptor> {
    let cleaned = COMMENT_RE.replace_all(style, " ");
    let frames = keyframes(&cleaned);
    let without_keyframes = KEYFRAMES_RE.replace_all(&cleaned, " ");

    let mut out = Vec::new();
    for rule in RULE_RE.captures_iter(&without_keyframes) {
        let (Some(selector), Some(body)) = (rule.get(1), rule.get(2)) else {
            continue;
        };
        let selector = selector.as_str().trim();
        for decl in MOTION_DECL_RE.captures_iter(body.as_str()) {
            let (Some(prop), Some(value)) = (decl.get(1), decl.get(2)) else {
                continue;
            };
            let value = value.as_str().trim();
            let id = format!("css-{}", out.len() + 1);
            let descriptor = if prop.as_str() == "animation" {
                css_animation(id, selector, value, &frames, default_duration_ms)
            } else {
                css_transition(id, selector, value, default_duration_ms)
            };
            out.push(descriptor);
        }
    }
    out
}

fn css_animation(
    id: String,
    selector: &str,
    value: &str,
    frames: &BTreeMap<String, String>,
    default_duration_ms: f64,
) -> AnimationDescriptor {
    let name = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .find(|word| frames.contains_key(*word))
        .or_else(|| {
            value.split_whitespace().find(|w| {
                !TIMING_KEYWORDS.contains(w)
                    && parse_duration_ms(w).is_none()
                    && !w.starts_with(|c: char| c.is_ascii_digit())
                    && !w.starts_with("cubic-bezier")
                    && !w.starts_with("steps")
            })
        })
        .unwrap_or("anonymous")
        .to_string();

    let properties = frames.get(&name).map(|b| keyframe_properties(b)).unwrap_or_default();
    descriptor(
        id,
        AnimationType::CssAnimation,
        selector,
        Some(name),
        parse_duration_ms(value).unwrap_or(default_duration_ms),
        properties,
    )
}

fn css_transition(id: String, selector: &str, value: &str, default_duration_ms: f64) -> AnimationDescriptor {
    let mut properties: Vec<String> = Vec::new();
    for part in value.split(',') {
        if let Some(first) = part.split_whitespace().next() {
            if parse_duration_ms(first).is_none() && !properties.iter().any(|p| p == first) {
                properties.push(first.to_string());
            }
        }
    }
    if properties.is_empty() {
        properties.push("all".to_string());
    }
    descriptor(
        id,
        AnimationType::CssTransition,
        selector,
        None,
        parse_duration_ms(value).unwrap_or(default_duration_ms),
        properties,
    )
}

fn descriptor(
    id: String,
    kind: AnimationType,
    selector: &str,
    name: Option<String>,
    duration: f64,
    properties: Vec<String>,
) -> AnimationDescriptor {
    AnimationDescriptor {
        id,
        kind,
        selector: selector.to_string(),
        name,
        duration,
        fps: kind.base_fps(),
        frame_drops: 0,
        gpu_accelerated: is_gpu_accelerated(&properties),
        complexity: css_complexity(&properties),
        properties,
    }
}

/// Animations started from script. Every textual match yields one descriptor.
#[must_use]
pub fn from_script(script: &str) -> Vec<AnimationDescriptor> {
    let mut found: Vec<(usize, &ScriptApi)> = Vec::new();
    for (api, re) in SCRIPT_APIS.iter().zip(SCRIPT_RES.iter()) {
        for m in re.find_iter(script) {
            found.push((m.start(), api));
        }
    }
    found.sort_by_key(|(pos, _)| *pos);

    found
        .into_iter()
        .enumerate()
        .map(|(i, (pos, api))| AnimationDescriptor {
            id: format!("js-{}", i + 1),
            kind: api.kind,
            selector: format!("script@{pos}"),
            name: None,
            duration: api.duration_ms,
            fps: api.kind.base_fps(),
            frame_drops: 0,
            properties: api.properties.iter().map(|p| (*p).to_string()).collect(),
            gpu_accelerated: api.gpu_accelerated,
            complexity: api.complexity,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyframes_capture_flat_and_nested_bodies() {
        let css = "@keyframes spin { transform: rotate(360deg) } @keyframes fade { from { opacity: 0 } to { opacity: 1 } }";
        let k = keyframes(css);
        assert_eq!(k.len(), 2);
        assert_eq!(keyframe_properties(&k["spin"]), vec!["transform"]);
        assert_eq!(keyframe_properties(&k["fade"]), vec!["opacity"]);
    }

    #[test]
    fn durations_parse_both_units() {
        assert_eq!(parse_duration_ms("spin 2000ms linear"), Some(2000.0));
        assert_eq!(parse_duration_ms("opacity .25s ease"), Some(250.0));
        assert_eq!(parse_duration_ms("spin linear"), None);
    }

    #[test]
    fn css_animation_links_keyframes() {
        let css = ".loader { animation: spin 2000ms linear infinite; } @keyframes spin { transform: rotate(360deg) }";
        let found = from_style(css, 300.0);
        assert_eq!(found.len(), 1);
        let a = &found[0];
        assert_eq!(a.kind, AnimationType::CssAnimation);
        assert_eq!(a.selector, ".loader");
        assert_eq!(a.name.as_deref(), Some("spin"));
        assert!((a.duration - 2000.0).abs() < f64::EPSILON);
        assert!(a.gpu_accelerated);
        assert_eq!(a.complexity, Complexity::Low);
    }

    #[test]
    fn transition_lists_properties_and_defaults_duration() {
        let found = from_style(".btn { transition: width, background-color; }", 300.0);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].properties, vec!["width", "background-color"]);
        assert!((found[0].duration - 300.0).abs() < f64::EPSILON);
        assert!(!found[0].gpu_accelerated);
        assert_eq!(found[0].complexity, Complexity::Medium);
    }

    #[test]
    fn transition_all_is_high_complexity() {
        let found = from_style(".x { transition: all 0.3s; }", 300.0);
        assert_eq!(found[0].complexity, Complexity::High);
    }

    #[test]
    fn script_matches_each_occurrence() {
        let js = "requestAnimationFrame(tick); el.animate([{opacity:0}], 200); gsap.to('.a', {x: 10}); requestAnimationFrame(tick);";
        let found = from_script(js);
        let kinds: Vec<_> = found.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![
                AnimationType::RequestAnimationFrame,
                AnimationType::WebAnimations,
                AnimationType::Gsap,
                AnimationType::RequestAnimationFrame,
            ]
        );
    }

    #[test]
    fn no_motion_means_no_descriptors() {
        assert!(from_style(".a { color: red; }", 300.0).is_empty());
        assert!(from_script("console.log('hi')").is_empty());
    }
}
