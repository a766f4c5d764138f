// src/tokens/color.rs
//! Color literal parsing, normalization and distance.

use regex::Regex;
use std::sync::LazyLock;

static COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    let names = NAMED_COLORS
        .iter()
        .map(|(n, _)| *n)
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(
        r"(?i)#[0-9a-f]{{3,8}}\b|(?:rgba?|hsla?)\([^)]*\)|\b(?:{names})\b"
    ))
    .unwrap_or_else(|_| panic!("Invalid Regex"))
});

const NAMED_COLORS: &[(&str, (u8, u8, u8))] = &[
    ("black", (0, 0, 0)),
    ("white", (255, 255, 255)),
    ("red", (255, 0, 0)),
    ("green", (0, 128, 0)),
    ("blue", (0, 0, 255)),
    ("yellow", (255, 255, 0)),
    ("orange", (255, 165, 0)),
    ("purple", (128, 0, 128)),
    ("pink", (255, 192, 203)),
    ("gray", (128, 128, 128)),
    ("grey", (128, 128, 128)),
    ("silver", (192, 192, 192)),
    ("navy", (0, 0, 128)),
    ("teal", (0, 128, 128)),
    ("maroon", (128, 0, 0)),
    ("olive", (128, 128, 0)),
    ("lime", (0, 255, 0)),
    ("aqua", (0, 255, 255)),
    ("cyan", (0, 255, 255)),
    ("fuchsia", (255, 0, 255)),
    ("magenta", (255, 0, 255)),
    ("coral", (255, 127, 80)),
    ("crimson", (220, 20, 60)),
    ("gold", (255, 215, 0)),
    ("indigo", (75, 0, 130)),
    ("tomato", (255, 99, 71)),
    ("whitesmoke", (245, 245, 245)),
    ("transparent", (0, 0, 0)),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    #[must_use]
    pub fn distance(&self, other: &Rgb) -> f64 {
        let dr = self.r - other.r;
        let dg = self.g - other.g;
        let db = self.b - other.b;
        (dr * dr + dg * dg + db * db).sqrt()
    }
}

/// All color literals in a declaration value, in order.
#[must_use]
pub fn find_colors(value: &str) -> Vec<String> {
    COLOR_RE
        .find_iter(value)
        .map(|m| m.as_str().to_string())
        .filter(|c| !c.starts_with('#') || matches!(c.len(), 4 | 5 | 7 | 9))
        .collect()
}

/// Canonical spelling: `#RRGGBB[AA]` uppercase, functions lowercase without
/// spaces, names lowercase.
#[must_use]
pub fn normalize(color: &str) -> String {
    let trimmed = color.trim();
    if let Some(hex) = trimmed.strip_prefix('#') {
        let expanded: String = if hex.len() == 3 || hex.len() == 4 {
            hex.chars().flat_map(|c| [c, c]).collect()
        } else {
            hex.to_string()
        };
        return format!("#{}", expanded.to_ascii_uppercase());
    }
    trimmed
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Grouping key: 4-character hex prefix, function name, or the name itself.
#[must_use]
pub fn prefix_key(normalized: &str) -> String {
    if normalized.starts_with('#') {
        return normalized.chars().take(4).collect();
    }
    match normalized.find('(') {
        Some(idx) => normalized[..idx].trim_end_matches('a').to_string(),
        None => normalized.to_string(),
    }
}

/// Parses a normalized or raw color literal into RGB. Alpha is ignored.
#[must_use]
pub fn parse(color: &str) -> Option<Rgb> {
    let normalized = normalize(color);
    if let Some(hex) = normalized.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(args) = function_args(&normalized, "rgb") {
        return parse_rgb_args(&args);
    }
    if let Some(args) = function_args(&normalized, "hsl") {
        return parse_hsl_args(&args);
    }
    NAMED_COLORS
        .iter()
        .find(|(n, _)| *n == normalized)
        .map(|(_, (r, g, b))| Rgb {
            r: f64::from(*r),
            g: f64::from(*g),
            b: f64::from(*b),
        })
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    if hex.len() != 6 && hex.len() != 8 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok().map(f64::from);
    Some(Rgb {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
    })
}

fn function_args(normalized: &str, name: &str) -> Option<Vec<String>> {
    let rest = normalized
        .strip_prefix(name)?
        .trim_start_matches('a')
        .strip_prefix('(')?
        .strip_suffix(')')?;
    Some(
        rest.split(|c| c == ',' || c == '/' || c == ' ')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

fn parse_rgb_args(args: &[String]) -> Option<Rgb> {
    let channel = |s: &String| -> Option<f64> {
        if let Some(pct) = s.strip_suffix('%') {
            pct.parse::<f64>().ok().map(|p| (p * 2.55).clamp(0.0, 255.0))
        } else {
            s.parse::<f64>().ok().map(|v| v.clamp(0.0, 255.0))
        }
    };
    Some(Rgb {
        r: channel(args.first()?)?,
        g: channel(args.get(1)?)?,
        b: channel(args.get(2)?)?,
    })
}

fn parse_hsl_args(args: &[String]) -> Option<Rgb> {
    let h = args.first()?.trim_end_matches("deg").parse::<f64>().ok()?;
    let s = args.get(1)?.trim_end_matches('%').parse::<f64>().ok()? / 100.0;
    let l = args.get(2)?.trim_end_matches('%').parse::<f64>().ok()? / 100.0;
    Some(hsl_to_rgb(h, s.clamp(0.0, 1.0), l.clamp(0.0, 1.0)))
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r1, g1, b1) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    Rgb {
        r: ((r1 + m) * 255.0).round(),
        g: ((g1 + m) * 255.0).round(),
        b: ((b1 + m) * 255.0).round(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_hex_expands_and_uppercases() {
        assert_eq!(normalize("#fa0"), "#FFAA00");
        assert_eq!(normalize(" rgb(0, 0, 0) "), "rgb(0,0,0)");
    }

    #[test]
    fn prefix_keys_follow_literal_kind() {
        assert_eq!(prefix_key("#FF0100"), "#FF0");
        assert_eq!(prefix_key("rgba(1,2,3,0.5)"), "rgb");
        assert_eq!(prefix_key("hsl(10,50%,50%)"), "hsl");
        assert_eq!(prefix_key("red"), "red");
    }

    #[test]
    fn equivalent_spellings_parse_to_same_rgb() {
        let a = parse("#ff0000");
        let b = parse("rgb(255, 0, 0)");
        let c = parse("hsl(0, 100%, 50%)");
        let d = parse("red");
        assert!(a.is_some());
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a, d);
    }

    #[test]
    fn distance_is_euclidean() {
        let (Some(a), Some(b)) = (parse("#FF0000"), parse("#FF0100")) else {
            panic!("colors should parse");
        };
        assert!((a.distance(&b) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn finds_literals_but_not_invalid_hex() {
        let found = find_colors("1px solid #12345 , #abc and rgba(0,0,0,.2) red");
        assert_eq!(found, vec!["#abc", "rgba(0,0,0,.2)", "red"]);
    }
}
