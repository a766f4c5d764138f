use crate::types::Dimension;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_true")]
    pub write_reports: bool,
    /// Seed for the simulation RNG. `None` draws from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
    #[serde(default = "default_timeout_ms")]
    pub analysis_timeout_ms: u64,
    #[serde(default = "default_enabled")]
    pub enabled: Vec<Dimension>,
    #[serde(default)]
    pub tokens: TokenConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub cognitive: CognitiveConfig,
    #[serde(default)]
    pub visual: VisualConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            write_reports: true,
            seed: None,
            max_workers: default_max_workers(),
            analysis_timeout_ms: default_timeout_ms(),
            enabled: default_enabled(),
            tokens: TokenConfig::default(),
            animation: AnimationConfig::default(),
            cognitive: CognitiveConfig::default(),
            visual: VisualConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    #[serde(default = "default_ideal_ratio")]
    pub ideal_ratio: f64,
    /// RGB distance under which a new color joins an existing group.
    #[serde(default = "default_group_distance")]
    pub group_distance: f64,
    /// RGB distance under which two distinct colors are reported as near-duplicates.
    #[serde(default = "default_similar_distance")]
    pub similar_distance: f64,
    #[serde(default = "default_max_colors")]
    pub max_distinct_colors: usize,
    #[serde(default = "default_system_tokens")]
    pub system_min_tokens: usize,
    #[serde(default = "default_system_groups")]
    pub system_min_groups: usize,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            ideal_ratio: default_ideal_ratio(),
            group_distance: default_group_distance(),
            similar_distance: default_similar_distance(),
            max_distinct_colors: default_max_colors(),
            system_min_tokens: default_system_tokens(),
            system_min_groups: default_system_groups(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationConfig {
    #[serde(default = "default_anim_duration")]
    pub default_duration_ms: f64,
    #[serde(default = "default_long_duration")]
    pub long_duration_ms: f64,
    #[serde(default = "default_duration_budget")]
    pub total_duration_budget_ms: f64,
    #[serde(default)]
    pub write_frames: bool,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            default_duration_ms: default_anim_duration(),
            long_duration_ms: default_long_duration(),
            total_duration_budget_ms: default_duration_budget(),
            write_frames: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CognitiveConfig {
    #[serde(default = "default_chars_per_field")]
    pub assumed_chars_per_field: usize,
    #[serde(default = "default_long_task")]
    pub long_task_ms: f64,
}

impl Default for CognitiveConfig {
    fn default() -> Self {
        Self {
            assumed_chars_per_field: default_chars_per_field(),
            long_task_ms: default_long_task(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualConfig {
    #[serde(default = "default_viewports")]
    pub viewports: Vec<u32>,
    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,
    #[serde(default = "default_layout_shift")]
    pub layout_shift_px: f64,
    #[serde(default = "default_fixed_width")]
    pub fixed_width_limit_px: f64,
    /// Fraction of differing pixels above which a state counts as changed.
    #[serde(default = "default_diff_threshold")]
    pub diff_threshold: f64,
    /// Summed per-channel difference under which two pixels count as equal.
    #[serde(default = "default_pixel_tolerance")]
    pub pixel_tolerance: u32,
    /// Baseline store. Defaults to `<output_dir>/baselines`.
    #[serde(default)]
    pub baseline_dir: Option<PathBuf>,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            viewports: default_viewports(),
            viewport_height: default_viewport_height(),
            layout_shift_px: default_layout_shift(),
            fixed_width_limit_px: default_fixed_width(),
            diff_threshold: default_diff_threshold(),
            pixel_tolerance: default_pixel_tolerance(),
            baseline_dir: None,
        }
    }
}

const fn default_true() -> bool { true }
fn default_output_dir() -> PathBuf { PathBuf::from(".ux-reports") }
const fn default_max_workers() -> usize { 4 }
const fn default_timeout_ms() -> u64 { 30_000 }
fn default_enabled() -> Vec<Dimension> { Dimension::ALL.to_vec() }

const fn default_ideal_ratio() -> f64 { 5.0 }
const fn default_group_distance() -> f64 { 30.0 }
const fn default_similar_distance() -> f64 { 20.0 }
const fn default_max_colors() -> usize { 12 }
const fn default_system_tokens() -> usize { 20 }
const fn default_system_groups() -> usize { 10 }

const fn default_anim_duration() -> f64 { 300.0 }
const fn default_long_duration() -> f64 { 1000.0 }
const fn default_duration_budget() -> f64 { 2000.0 }

const fn default_chars_per_field() -> usize { 10 }
const fn default_long_task() -> f64 { 10_000.0 }

fn default_viewports() -> Vec<u32> { vec![1280, 768, 375] }
const fn default_viewport_height() -> u32 { 800 }
const fn default_layout_shift() -> f64 { 20.0 }
const fn default_fixed_width() -> f64 { 500.0 }
const fn default_diff_threshold() -> f64 { 0.10 }
const fn default_pixel_tolerance() -> u32 { 32 }
