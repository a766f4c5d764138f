// src/tokens/mod.rs
//! Design-token extraction and consistency scoring.
//!
//! Literal style values are pulled out of style text per category, clustered
//! into similarity groups and scored by how much each group is reused.

pub mod color;
pub mod extract;
pub mod group;
pub mod score;

use crate::analyzer::{load_optional, Analyzer};
use crate::artifact::ComponentArtifact;
use crate::config::TokenConfig;
use crate::error::Result;
use crate::types::{Dimension, Scored};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Color,
    Spacing,
    Typography,
    Shadow,
    Border,
    Animation,
    Other,
}

impl TokenType {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::Spacing => "spacing",
            Self::Typography => "typography",
            Self::Shadow => "shadow",
            Self::Border => "border",
            Self::Animation => "animation",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignToken {
    pub name: String,
    pub value: String,
    #[serde(rename = "type")]
    pub token_type: TokenType,
}

impl DesignToken {
    #[must_use]
    pub fn new(name: &str, value: impl Into<String>, token_type: TokenType) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
            token_type,
        }
    }
}

/// Token values judged interchangeable. `members` keeps every occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenGroup {
    pub group_key: String,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTokens {
    pub tokens: Vec<DesignToken>,
    pub groups: Vec<TokenGroup>,
}

pub type TokenMap = BTreeMap<TokenType, CategoryTokens>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryMetrics {
    pub token_count: usize,
    pub group_count: usize,
    pub singleton_groups: usize,
    pub distinct_values: usize,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAnalysis {
    pub categories: BTreeMap<TokenType, CategoryMetrics>,
    pub total_tokens: usize,
    pub total_groups: usize,
    pub tokens: TokenMap,
}

/// The Token Extractor. Stateless after construction.
#[derive(Debug, Clone, Default)]
pub struct TokenExtractor {
    config: TokenConfig,
}

impl TokenExtractor {
    #[must_use]
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    /// Extracts and groups tokens by category. Malformed text yields an empty map.
    #[must_use]
    pub fn extract_tokens(&self, style: &str) -> TokenMap {
        let mut map = TokenMap::new();
        for token in extract::extract_all(style) {
            map.entry(token.token_type).or_default().tokens.push(token);
        }
        for (kind, category) in &mut map {
            category.groups = group::group_tokens(*kind, &category.tokens, self.config.group_distance);
        }
        map
    }

    /// Scores token consistency for `style`.
    #[must_use]
    pub fn analyze_consistency(&self, style: &str) -> Scored<TokenAnalysis> {
        let tokens = self.extract_tokens(style);
        let categories: BTreeMap<TokenType, CategoryMetrics> = tokens
            .iter()
            .map(|(kind, cat)| (*kind, score::category_metrics(cat, self.config.ideal_ratio)))
            .collect();

        let score = score::overall_score(&categories);
        let issues = score::issues(&tokens, &categories, &self.config);

        Scored {
            score,
            issues,
            metrics: TokenAnalysis {
                total_tokens: categories.values().map(|m| m.token_count).sum(),
                total_groups: categories.values().map(|m| m.group_count).sum(),
                categories,
                tokens,
            },
        }
    }
}

impl Analyzer for TokenExtractor {
    type Metrics = TokenAnalysis;

    fn dimension(&self) -> Dimension {
        Dimension::DesignTokens
    }

    fn applies_to(&self, artifact: &ComponentArtifact) -> bool {
        artifact.style.is_some()
    }

    fn evaluate(&self, artifact: &ComponentArtifact) -> Result<Scored<TokenAnalysis>> {
        let style = load_optional(artifact.style.as_ref())?;
        Ok(self.analyze_consistency(style.as_deref().unwrap_or("")))
    }
}
