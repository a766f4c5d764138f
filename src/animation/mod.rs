// src/animation/mod.rs
//! Animation Analyzer.
//!
//! Animations are read from style sheets (`@keyframes`, `animation`,
//! `transition`) and from script (a table of animation APIs). Frame timing is
//! simulated per animation with a seedable random source and reduced to
//! frame-rate, power, duration and complexity sub-scores.

pub mod extract;
pub mod frames;
pub mod score;
pub mod simulate;

pub use frames::FrameTrace;

use crate::analyzer::{load_optional, Analyzer};
use crate::artifact::{sanitize_id, ComponentArtifact};
use crate::config::AnimationConfig;
use crate::error::Result;
use crate::markup;
use crate::output;
use crate::types::{Dimension, Scored};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnimationType {
    CssAnimation,
    CssTransition,
    RequestAnimationFrame,
    WebAnimations,
    Gsap,
    Anime,
    FramerMotion,
    Spring,
    GenericTransition,
}

impl AnimationType {
    /// Frame rate a simple animation of this type sustains.
    #[must_use]
    pub const fn base_fps(self) -> f64 {
        match self {
            Self::CssAnimation | Self::CssTransition | Self::WebAnimations | Self::Gsap => 60.0,
            Self::RequestAnimationFrame | Self::Anime | Self::FramerMotion => 58.0,
            Self::Spring | Self::GenericTransition => 55.0,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CssAnimation => "CSS animation",
            Self::CssTransition => "CSS transition",
            Self::RequestAnimationFrame => "requestAnimationFrame loop",
            Self::WebAnimations => "Web Animations API",
            Self::Gsap => "GSAP",
            Self::Anime => "anime.js",
            Self::FramerMotion => "Framer Motion",
            Self::Spring => "spring",
            Self::GenericTransition => "transition",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl Complexity {
    /// One level up, saturating at `High`.
    #[must_use]
    pub const fn bump(self) -> Self {
        match self {
            Self::Low => Self::Medium,
            Self::Medium | Self::High => Self::High,
        }
    }

    /// 1, 2 or 3.
    #[must_use]
    pub const fn weight(self) -> f64 {
        match self {
            Self::Low => 1.0,
            Self::Medium => 2.0,
            Self::High => 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationDescriptor {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AnimationType,
    pub selector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Milliseconds.
    pub duration: f64,
    /// Simulated mean fps once analyzed; the type's base fps before.
    pub fps: f64,
    pub frame_drops: usize,
    pub properties: Vec<String>,
    pub gpu_accelerated: bool,
    pub complexity: Complexity,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameSample {
    /// End of the frame, milliseconds from the start of the simulation.
    pub timestamp: f64,
    pub frame_duration: f64,
    pub fps: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationMetrics {
    pub animation_count: usize,
    pub average_fps: f64,
    pub frame_drops: usize,
    pub power_efficiency: f64,
    pub gpu_accelerated_count: usize,
    pub total_duration: f64,
    pub frame_rate_score: f64,
    pub power_score: f64,
    pub duration_score: f64,
    pub complexity_score: f64,
    pub animations: Vec<AnimationDescriptor>,
    /// Some animation ran longer than the simulated window, or the
    /// component hit the frame ceiling.
    pub simulation_truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frames_path: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FrameDump<'a> {
    component_id: &'a str,
    samples: &'a [FrameSample],
    trace: FrameTrace,
}

/// The Animation Analyzer. Stateless after construction; each call draws a
/// fresh generator from the configured seed.
#[derive(Debug, Clone, Default)]
pub struct AnimationAnalyzer {
    config: AnimationConfig,
    seed: Option<u64>,
    output_dir: Option<PathBuf>,
}

impl AnimationAnalyzer {
    #[must_use]
    pub fn new(config: AnimationConfig, seed: Option<u64>) -> Self {
        Self {
            config,
            seed,
            output_dir: None,
        }
    }

    /// Directory receiving frame dumps when `write_frames` is set.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    fn rng(&self) -> StdRng {
        self.seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
    }

    /// Animations declared in the component. `<style>` blocks inside the
    /// markup count as style.
    #[must_use]
    pub fn declared_animations(&self, markup: &str, style: &str, script: &str) -> Vec<AnimationDescriptor> {
        let mut css = markup::embedded_styles(markup);
        if !style.is_empty() {
            css.push('\n');
            css.push_str(style);
        }
        let mut found = extract::from_style(&css, self.config.default_duration_ms);
        found.extend(extract::from_script(script));
        found
    }

    /// Simulated frames for every declared animation, back to back.
    ///
    /// # Errors
    /// Returns error if frame dumps are enabled and cannot be written.
    pub fn track_frame_rate(&self, markup: &str, style: &str, script: &str, id: &str) -> Result<Vec<FrameSample>> {
        let mut animations = self.declared_animations(markup, style, script);
        let (samples, _) = run_simulation(&mut animations, &mut self.rng());
        self.dump_frames(id, &samples)?;
        Ok(samples)
    }

    /// Scores the component's animations.
    ///
    /// # Errors
    /// Returns error if frame dumps are enabled and cannot be written.
    pub fn analyze_animation_performance(
        &self,
        markup: &str,
        style: &str,
        script: &str,
        id: &str,
    ) -> Result<Scored<AnimationMetrics>> {
        self.analyze_with_rng(markup, style, script, id, &mut self.rng())
    }

    /// Same as [`Self::analyze_animation_performance`] with a caller-owned
    /// random source.
    ///
    /// # Errors
    /// Returns error if frame dumps are enabled and cannot be written.
    pub fn analyze_with_rng<R: Rng + ?Sized>(
        &self,
        markup: &str,
        style: &str,
        script: &str,
        id: &str,
        rng: &mut R,
    ) -> Result<Scored<AnimationMetrics>> {
        let mut animations = self.declared_animations(markup, style, script);
        if animations.is_empty() {
            return Ok(Scored {
                score: 100.0,
                issues: Vec::new(),
                metrics: AnimationMetrics::default(),
            });
        }

        let (samples, truncated) = run_simulation(&mut animations, rng);
        debug!(component = id, animations = animations.len(), frames = samples.len(), truncated, "simulated frames");

        let mut metrics = score::metrics(animations, &samples, &self.config);
        metrics.simulation_truncated = truncated;
        metrics.frames_path = self.dump_frames(id, &samples)?;

        Ok(Scored {
            score: score::overall(&metrics),
            issues: score::issues(&metrics, &self.config),
            metrics,
        })
    }

    fn dump_frames(&self, id: &str, samples: &[FrameSample]) -> Result<Option<PathBuf>> {
        let Some(dir) = self.output_dir.as_deref().filter(|_| self.config.write_frames) else {
            return Ok(None);
        };
        let path = frames_path(dir, id);
        let dump = FrameDump {
            component_id: id,
            samples,
            trace: FrameTrace::from_samples(samples),
        };
        output::write_json(&path, &dump)?;
        Ok(Some(path))
    }
}

fn frames_path(dir: &Path, id: &str) -> PathBuf {
    dir.join("frames").join(format!("{}.json", sanitize_id(id)))
}

/// Simulates each animation after the previous one and records its mean fps
/// and drop count on the descriptor. Every animation gets at least one frame;
/// beyond that the component shares [`simulate::MAX_TOTAL_FRAMES`]. The flag
/// reports whether any animation was cut short.
fn run_simulation<R: Rng + ?Sized>(animations: &mut [AnimationDescriptor], rng: &mut R) -> (Vec<FrameSample>, bool) {
    let mut all = Vec::new();
    let mut start = 0.0;
    let mut truncated = false;
    for anim in animations.iter_mut() {
        let wanted = simulate::frame_count(anim.duration);
        let limit = wanted.min(simulate::MAX_TOTAL_FRAMES.saturating_sub(all.len())).max(1);
        truncated |= limit < wanted || simulate::is_truncated(anim.duration);
        let samples = simulate::simulate(anim, start, limit, rng);
        anim.fps = score::mean_fps(&samples);
        anim.frame_drops = score::count_drops(&samples);
        start = samples.last().map_or(start, |s| s.timestamp);
        all.extend(samples);
    }
    (all, truncated)
}

impl Analyzer for AnimationAnalyzer {
    type Metrics = AnimationMetrics;

    fn dimension(&self) -> Dimension {
        Dimension::Animation
    }

    fn applies_to(&self, artifact: &ComponentArtifact) -> bool {
        artifact.markup.is_some() || artifact.style.is_some() || artifact.script.is_some()
    }

    fn evaluate(&self, artifact: &ComponentArtifact) -> Result<Scored<AnimationMetrics>> {
        let markup = load_optional(artifact.markup.as_ref())?;
        let style = load_optional(artifact.style.as_ref())?;
        let script = load_optional(artifact.script.as_ref())?;
        self.analyze_animation_performance(
            markup.as_deref().unwrap_or(""),
            style.as_deref().unwrap_or(""),
            script.as_deref().unwrap_or(""),
            &artifact.component_id,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;

    const SPIN: &str = ".loader { animation: spin 2000ms linear infinite; } @keyframes spin { transform: rotate(360deg) }";

    fn seeded() -> AnimationAnalyzer {
        AnimationAnalyzer::new(AnimationConfig::default(), Some(7))
    }

    #[test]
    fn no_animations_is_a_perfect_zero_state() {
        let r = seeded().analyze_animation_performance("<div></div>", ".a { color: red; }", "", "c").unwrap();
        assert!((r.score - 100.0).abs() < f64::EPSILON);
        assert!(r.issues.is_empty());
        assert_eq!(r.metrics.animation_count, 0);
    }

    #[test]
    fn long_spin_is_flagged_without_frame_rate_issues() {
        let r = seeded().analyze_animation_performance("", SPIN, "", "spinner").unwrap();
        assert_eq!(r.metrics.animation_count, 1);
        let a = &r.metrics.animations[0];
        assert!(a.gpu_accelerated);
        assert_eq!(a.complexity, Complexity::Low);
        assert!((a.duration - 2000.0).abs() < f64::EPSILON);

        let long = r.issues.iter().find(|i| i.id.starts_with("animation-long-duration")).unwrap();
        assert_eq!(long.severity, Severity::Low);
        assert_eq!(long.animation.as_deref(), Some("css-1"));
        assert!(r.metrics.average_fps >= 45.0);
        assert!(!r.issues.iter().any(|i| i.id == "animation-low-fps"));
    }

    #[test]
    fn seeded_runs_are_identical() {
        let a = seeded().analyze_animation_performance("", SPIN, "requestAnimationFrame(f)", "c").unwrap();
        let b = seeded().analyze_animation_performance("", SPIN, "requestAnimationFrame(f)", "c").unwrap();
        assert!((a.score - b.score).abs() < f64::EPSILON);
        assert_eq!(a.issues, b.issues);
        assert_eq!(a.metrics.animations, b.metrics.animations);
    }

    #[test]
    fn embedded_style_blocks_are_analyzed() {
        let markup = format!("<style>{SPIN}</style><div class=\"loader\"></div>");
        let found = seeded().declared_animations(&markup, "", "");
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn frames_are_back_to_back() {
        let frames = seeded()
            .track_frame_rate("", ".a { transition: opacity 100ms; } .b { transition: opacity 100ms; }", "", "c")
            .unwrap();
        assert_eq!(frames.len(), 12);
        assert!(frames.windows(2).all(|w| w[1].timestamp > w[0].timestamp));
        let trace = FrameTrace::from_samples(&frames);
        assert_eq!(trace.frame_deltas.len(), frames.len());
    }

    #[test]
    fn enormous_duration_is_simulated_within_the_window() {
        let style = ".slow { animation: drift 99999999s linear; } @keyframes drift { transform: translateX(10px) }";
        let r = seeded().analyze_animation_performance("", style, "", "c").unwrap();
        assert!(r.metrics.simulation_truncated);
        let frames = seeded().track_frame_rate("", style, "", "c").unwrap();
        assert_eq!(frames.len(), simulate::MAX_FRAMES);
        let info = r.issues.iter().find(|i| i.id == "animation-simulation-truncated").unwrap();
        assert_eq!(info.severity, Severity::Info);
        assert!((0.0..=100.0).contains(&r.score));
    }

    #[test]
    fn frame_total_is_shared_across_animations() {
        let style = ".a { transition: opacity 120s; }\n".repeat(40);
        let frames = seeded().track_frame_rate("", &style, "", "c").unwrap();
        assert!(frames.len() <= simulate::MAX_TOTAL_FRAMES + 40);
        assert!(!seeded().analyze_animation_performance("", "", "", "c").unwrap().metrics.simulation_truncated);
    }

    #[test]
    fn frame_dump_is_written_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnimationConfig {
            write_frames: true,
            ..AnimationConfig::default()
        };
        let analyzer = AnimationAnalyzer::new(config, Some(1)).with_output_dir(dir.path());
        let r = analyzer.analyze_animation_performance("", SPIN, "", "My Button").unwrap();
        let path = r.metrics.frames_path.unwrap();
        assert!(path.starts_with(dir.path().join("frames")));
        assert!(path.exists());
    }
}
