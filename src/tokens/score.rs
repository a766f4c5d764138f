// src/tokens/score.rs
//! Consistency scoring and issue policy for design tokens.

use super::group::near_duplicate_colors;
use super::{CategoryMetrics, CategoryTokens, TokenMap, TokenType};
use crate::config::TokenConfig;
use crate::types::{Issue, Severity};

/// Scored categories and their weights in the overall score.
pub const CATEGORY_WEIGHTS: [(TokenType, f64); 5] = [
    (TokenType::Color, 0.30),
    (TokenType::Spacing, 0.25),
    (TokenType::Typography, 0.20),
    (TokenType::Border, 0.15),
    (TokenType::Shadow, 0.10),
];

/// `min(100, (n / groups) / ideal * 100)`, damped by the share of singleton groups.
/// An empty category has nothing to be inconsistent about and scores 100.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn category_score(token_count: usize, group_count: usize, singletons: usize, ideal_ratio: f64) -> f64 {
    if token_count == 0 || group_count == 0 {
        return 100.0;
    }
    let ratio = token_count as f64 / group_count as f64;
    let base = (ratio / ideal_ratio * 100.0).min(100.0);
    let singleton_ratio = singletons as f64 / group_count as f64;
    base * (1.0 - singleton_ratio * 0.5)
}

#[must_use]
pub fn category_metrics(tokens: &CategoryTokens, ideal_ratio: f64) -> CategoryMetrics {
    let group_count = tokens.groups.len();
    let singleton_groups = tokens.groups.iter().filter(|g| g.members.len() == 1).count();
    let mut distinct: Vec<&str> = tokens.tokens.iter().map(|t| t.value.as_str()).collect();
    distinct.sort_unstable();
    distinct.dedup();

    CategoryMetrics {
        token_count: tokens.tokens.len(),
        group_count,
        singleton_groups,
        distinct_values: distinct.len(),
        score: category_score(tokens.tokens.len(), group_count, singleton_groups, ideal_ratio),
    }
}

/// Weighted sum over the scored categories.
#[must_use]
pub fn overall_score(metrics: &std::collections::BTreeMap<TokenType, CategoryMetrics>) -> f64 {
    CATEGORY_WEIGHTS
        .iter()
        .map(|(kind, weight)| metrics.get(kind).map_or(100.0, |m| m.score) * weight)
        .sum()
}

/// Emits every token issue in a fixed order.
#[must_use]
pub fn issues(
    map: &TokenMap,
    metrics: &std::collections::BTreeMap<TokenType, CategoryMetrics>,
    config: &TokenConfig,
) -> Vec<Issue> {
    let mut out = Vec::new();

    for (kind, _) in CATEGORY_WEIGHTS {
        let Some(m) = metrics.get(&kind) else { continue };
        if let Some(issue) = inconsistency_issue(kind, m) {
            out.push(issue);
        }
    }

    let colors: Vec<String> = map
        .get(&TokenType::Color)
        .map(|c| c.tokens.iter().map(|t| t.value.clone()).collect())
        .unwrap_or_default();
    out.extend(near_duplicate_issue(&colors, config.similar_distance));
    out.extend(too_many_colors_issue(metrics, config.max_distinct_colors));
    out.extend(missing_system_issue(metrics, config));

    out
}

#[allow(clippy::cast_precision_loss)]
fn inconsistency_issue(kind: TokenType, m: &CategoryMetrics) -> Option<Issue> {
    if m.group_count <= 1 || (m.singleton_groups as f64 / m.group_count as f64) <= 0.5 {
        return None;
    }
    let label = kind.label();
    Some(
        Issue::new(
            format!("tokens-inconsistent-{label}"),
            format!("Inconsistent {label} tokens"),
            format!(
                "{} of {} {label} groups are used only once across {} declarations",
                m.singleton_groups, m.group_count, m.token_count
            ),
            Severity::Low,
        )
        .with_token_type(label)
        .recommend(recommendation(kind)),
    )
}

fn recommendation(kind: TokenType) -> &'static str {
    match kind {
        TokenType::Color => "Consolidate one-off colors into a shared palette of color tokens",
        TokenType::Spacing => "Adopt a spacing scale (for example 4px steps) and reference it through tokens",
        TokenType::Typography => "Define a type scale and reuse its sizes, weights and line heights",
        TokenType::Border => "Standardize border widths and radii as tokens",
        TokenType::Shadow => "Limit elevation to a small set of shadow tokens",
        TokenType::Animation | TokenType::Other => "Move repeated literal values into named tokens",
    }
}

fn near_duplicate_issue(colors: &[String], threshold: f64) -> Option<Issue> {
    let pairs = near_duplicate_colors(colors, threshold);
    if pairs.is_empty() {
        return None;
    }
    let listed: Vec<String> = pairs
        .iter()
        .map(|(a, b, d)| format!("{a} ~ {b} (distance {d:.1})"))
        .collect();
    Some(
        Issue::new(
            "tokens-similar-colors",
            "Near-duplicate colors",
            format!(
                "{} color pair(s) are visually indistinguishable: {}",
                pairs.len(),
                listed.join(", ")
            ),
            Severity::Warning,
        )
        .with_token_type(TokenType::Color.label())
        .recommend("Merge near-identical colors into a single color token"),
    )
}

fn too_many_colors_issue(
    metrics: &std::collections::BTreeMap<TokenType, CategoryMetrics>,
    max: usize,
) -> Option<Issue> {
    let distinct = metrics.get(&TokenType::Color)?.distinct_values;
    if distinct <= max {
        return None;
    }
    Some(
        Issue::new(
            "tokens-too-many-colors",
            "Too many colors",
            format!("{distinct} distinct colors are used (limit {max})"),
            Severity::Warning,
        )
        .with_token_type(TokenType::Color.label())
        .recommend("Reduce the palette to primary, secondary, neutral and feedback colors"),
    )
}

fn missing_system_issue(
    metrics: &std::collections::BTreeMap<TokenType, CategoryMetrics>,
    config: &TokenConfig,
) -> Option<Issue> {
    let total_tokens: usize = metrics.values().map(|m| m.token_count).sum();
    let total_groups: usize = metrics.values().map(|m| m.group_count).sum();
    if total_tokens <= config.system_min_tokens || total_groups <= config.system_min_groups {
        return None;
    }
    Some(
        Issue::new(
            "tokens-missing-system",
            "Missing design-token system",
            format!(
                "{total_tokens} literal style values fall into {total_groups} unrelated groups"
            ),
            Severity::High,
        )
        .recommend("Introduce CSS custom properties or a theme object and reference them instead of literals")
        .recommend("Document the token scale so new components reuse it"),
    )
}
