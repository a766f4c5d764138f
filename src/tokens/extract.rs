// src/tokens/extract.rs
//! Pure `style text -> tokens` rules, one per category.

use super::color;
use super::{DesignToken, TokenType};
use regex::Regex;
use std::sync::LazyLock;

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\*[\s\S]*?\*/").unwrap_or_else(|_| panic!("Invalid Regex")));

static DECL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[{;])\s*(--[\w-]+|[A-Za-z-]+)\s*:\s*([^;{}]+)")
        .unwrap_or_else(|_| panic!("Invalid Regex"))
});

static LENGTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-?\d*\.?\d+(?:px|rem|em|vh|vw|ch|%)").unwrap_or_else(|_| panic!("Invalid Regex"))
});

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?\d*\.?\d+m?s$").unwrap_or_else(|_| panic!("Invalid Regex"))
});

static SPACING_PROP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:margin|padding|gap|row-gap|column-gap|inset)(?:-[a-z-]+)?$")
        .unwrap_or_else(|_| panic!("Invalid Regex"))
});

static BORDER_PROP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^border(?:-(?:top|right|bottom|left))?(?:-(?:width|radius))?$|^border-(?:top|bottom)-(?:left|right)-radius$")
        .unwrap_or_else(|_| panic!("Invalid Regex"))
});

const TYPOGRAPHY_PROPS: &[&str] = &[
    "font",
    "font-size",
    "font-weight",
    "font-family",
    "line-height",
    "letter-spacing",
];

const SHADOW_PROPS: &[&str] = &["box-shadow", "text-shadow"];

/// Properties whose values are names, never colors.
const NON_COLOR_PROPS: &[&str] = &[
    "font-family",
    "animation",
    "animation-name",
    "transition",
    "transition-property",
    "grid-template-areas",
    "content",
];

/// A `property: value` pair found in style text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
}

/// All declarations in style text, comments removed.
#[must_use]
pub fn declarations(style: &str) -> Vec<Declaration> {
    let cleaned = COMMENT_RE.replace_all(style, " ");
    DECL_RE
        .captures_iter(&cleaned)
        .filter_map(|caps| {
            // `a:hover {` looks like a declaration until the brace
            let end = caps.get(0)?.end();
            if cleaned[end..].starts_with('{') {
                return None;
            }
            let property = caps.get(1)?.as_str().trim().to_string();
            let value = caps
                .get(2)?
                .as_str()
                .trim()
                .trim_end_matches("!important")
                .trim()
                .to_string();
            if value.is_empty() {
                None
            } else {
                Some(Declaration {
                    property: if property.starts_with("--") {
                        property
                    } else {
                        property.to_ascii_lowercase()
                    },
                    value,
                })
            }
        })
        .collect()
}

/// Extracts every token in `style`, in source order.
#[must_use]
pub fn extract_all(style: &str) -> Vec<DesignToken> {
    let mut tokens = Vec::new();
    for decl in declarations(style) {
        if decl.value.contains("var(") {
            continue;
        }
        if decl.property.starts_with("--") {
            tokens.push(custom_property(&decl));
            continue;
        }
        tokens.extend(color_tokens(&decl));
        tokens.extend(spacing_tokens(&decl));
        tokens.extend(typography_tokens(&decl));
        tokens.extend(border_tokens(&decl));
        tokens.extend(shadow_tokens(&decl));
    }
    tokens
}

#[must_use]
pub fn color_tokens(decl: &Declaration) -> Vec<DesignToken> {
    if NON_COLOR_PROPS.contains(&decl.property.as_str()) {
        return Vec::new();
    }
    color::find_colors(&decl.value)
        .into_iter()
        .map(|c| DesignToken::new(&decl.property, color::normalize(&c), TokenType::Color))
        .collect()
}

#[must_use]
pub fn spacing_tokens(decl: &Declaration) -> Vec<DesignToken> {
    if !SPACING_PROP_RE.is_match(&decl.property) {
        return Vec::new();
    }
    LENGTH_RE
        .find_iter(&decl.value)
        .map(|m| DesignToken::new(&decl.property, m.as_str(), TokenType::Spacing))
        .collect()
}

#[must_use]
pub fn typography_tokens(decl: &Declaration) -> Vec<DesignToken> {
    whole_value(decl, TYPOGRAPHY_PROPS.contains(&decl.property.as_str()), TokenType::Typography)
}

#[must_use]
pub fn border_tokens(decl: &Declaration) -> Vec<DesignToken> {
    whole_value(decl, BORDER_PROP_RE.is_match(&decl.property), TokenType::Border)
}

#[must_use]
pub fn shadow_tokens(decl: &Declaration) -> Vec<DesignToken> {
    whole_value(decl, SHADOW_PROPS.contains(&decl.property.as_str()), TokenType::Shadow)
}

fn whole_value(decl: &Declaration, matches: bool, kind: TokenType) -> Vec<DesignToken> {
    if !matches || decl.value.eq_ignore_ascii_case("none") {
        return Vec::new();
    }
    vec![DesignToken::new(&decl.property, collapse(&decl.value), kind)]
}

/// Classifies a `--custom-property` by its value, then by its name.
#[must_use]
pub fn custom_property(decl: &Declaration) -> DesignToken {
    let value = collapse(&decl.value);
    let name = decl.property.to_ascii_lowercase();
    let colors = color::find_colors(&value);

    if colors.len() == 1 && colors[0].len() == value.len() {
        return DesignToken::new(&decl.property, color::normalize(&value), TokenType::Color);
    }

    let kind = if name.contains("shadow") {
        TokenType::Shadow
    } else if name.contains("radius") || name.contains("border") {
        TokenType::Border
    } else if name.contains("font") || name.contains("text") || name.contains("leading") {
        TokenType::Typography
    } else if DURATION_RE.is_match(&value) || name.contains("duration") || name.contains("ease") {
        TokenType::Animation
    } else if LENGTH_RE.is_match(&value) {
        TokenType::Spacing
    } else {
        TokenType::Other
    };
    DesignToken::new(&decl.property, value, kind)
}

fn collapse(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(style: &str) -> Vec<(TokenType, String)> {
        extract_all(style)
            .into_iter()
            .map(|t| (t.token_type, t.value))
            .collect()
    }

    #[test]
    fn declarations_skip_selectors_and_media_queries() {
        let decls = declarations("a:hover { color: red; } @media (max-width: 600px) { .x { gap: 4px } }");
        let props: Vec<_> = decls.iter().map(|d| d.property.as_str()).collect();
        assert_eq!(props, vec!["color", "gap"]);
    }

    #[test]
    fn border_yields_border_and_color_tokens() {
        let found = kinds(".a { border: 1px solid #333; }");
        assert!(found.contains(&(TokenType::Color, "#333333".to_string())));
        assert!(found.contains(&(TokenType::Border, "1px solid #333".to_string())));
    }

    #[test]
    fn spacing_splits_shorthand() {
        let found = kinds(".a { margin: 4px 8px 0 1.5rem; }");
        assert_eq!(
            found,
            vec![
                (TokenType::Spacing, "4px".to_string()),
                (TokenType::Spacing, "8px".to_string()),
                (TokenType::Spacing, "1.5rem".to_string()),
            ]
        );
    }

    #[test]
    fn font_family_names_are_not_colors() {
        let found = kinds(".a { font-family: \"Red Hat\", sans-serif; }");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, TokenType::Typography);
    }

    #[test]
    fn var_references_are_not_literals() {
        assert!(kinds(".a { color: var(--brand, #fff); padding: var(--space-2); }").is_empty());
    }

    #[test]
    fn custom_properties_are_classified() {
        let found = kinds(":root { --brand: #0af; --space-sm: 4px; --speed: 200ms; --z: 10; }");
        assert_eq!(
            found,
            vec![
                (TokenType::Color, "#00AAFF".to_string()),
                (TokenType::Spacing, "4px".to_string()),
                (TokenType::Animation, "200ms".to_string()),
                (TokenType::Other, "10".to_string()),
            ]
        );
    }

    #[test]
    fn garbage_yields_nothing() {
        assert!(extract_all("}}}{{{ ;;; :::").is_empty());
        assert!(extract_all("").is_empty());
    }
}
