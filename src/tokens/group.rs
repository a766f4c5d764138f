// src/tokens/group.rs
//! Similarity grouping of token values.
//!
//! Groups approximate "probably the same design decision". They are coarse on
//! purpose: a prefix match is enough to share a group.

use super::color;
use super::{DesignToken, TokenGroup, TokenType};

/// Groups the tokens of one category. Every token value lands in exactly one group.
#[must_use]
pub fn group_tokens(kind: TokenType, tokens: &[DesignToken], group_distance: f64) -> Vec<TokenGroup> {
    match kind {
        TokenType::Color => group_colors(tokens, group_distance),
        _ => group_by_prefix(tokens),
    }
}

/// Exact value, then RGB distance to a group's first member, then prefix key.
#[must_use]
pub fn group_colors(tokens: &[DesignToken], group_distance: f64) -> Vec<TokenGroup> {
    let mut groups: Vec<TokenGroup> = Vec::new();

    for token in tokens {
        let value = &token.value;
        if let Some(g) = groups.iter_mut().find(|g| g.members.contains(value)) {
            g.members.push(value.clone());
            continue;
        }

        if let Some(rgb) = color::parse(value) {
            let near = groups.iter_mut().find(|g| {
                g.members
                    .first()
                    .and_then(|m| color::parse(m))
                    .is_some_and(|rep| rep.distance(&rgb) < group_distance)
            });
            if let Some(g) = near {
                g.members.push(value.clone());
                continue;
            }
        }

        push_keyed(&mut groups, color::prefix_key(value), value);
    }

    groups
}

/// Custom-property prefix (`--space-sm` => `--space`) or the first character of the value.
#[must_use]
pub fn group_by_prefix(tokens: &[DesignToken]) -> Vec<TokenGroup> {
    let mut groups: Vec<TokenGroup> = Vec::new();
    for token in tokens {
        push_keyed(&mut groups, prefix_of(token), &token.value);
    }
    groups
}

fn prefix_of(token: &DesignToken) -> String {
    if let Some(stripped) = token.name.strip_prefix("--") {
        if let Some((head, _)) = stripped.rsplit_once('-') {
            return format!("--{head}");
        }
        return token.name.clone();
    }
    token
        .value
        .chars()
        .next()
        .map(|c| c.to_ascii_lowercase().to_string())
        .unwrap_or_default()
}

fn push_keyed(groups: &mut Vec<TokenGroup>, key: String, value: &str) {
    match groups.iter_mut().find(|g| g.group_key == key) {
        Some(g) => g.members.push(value.to_string()),
        None => groups.push(TokenGroup {
            group_key: key,
            members: vec![value.to_string()],
        }),
    }
}

/// Distinct parsable color pairs closer than `threshold`, with their distance.
#[must_use]
pub fn near_duplicate_colors(values: &[String], threshold: f64) -> Vec<(String, String, f64)> {
    let mut distinct: Vec<&String> = Vec::new();
    for v in values {
        if !distinct.contains(&v) {
            distinct.push(v);
        }
    }

    let parsed: Vec<_> = distinct
        .iter()
        .filter_map(|v| color::parse(v).map(|rgb| (*v, rgb)))
        .collect();

    let mut pairs = Vec::new();
    for (i, (a, ra)) in parsed.iter().enumerate() {
        for (b, rb) in parsed.iter().skip(i + 1) {
            let d = ra.distance(rb);
            if d > 0.0 && d < threshold {
                pairs.push(((*a).clone(), (*b).clone(), d));
            }
        }
    }
    pairs
}
