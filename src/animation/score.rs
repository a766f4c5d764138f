// src/animation/score.rs
//! Metrics, sub-scores and issue thresholds for animations.

use super::simulate::DROP_FPS;
use super::{AnimationDescriptor, AnimationMetrics, Complexity, FrameSample};
use crate::config::AnimationConfig;
use crate::types::{clamp_score, Issue, Severity};

const TARGET_FPS: f64 = 60.0;

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean_fps(samples: &[FrameSample]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|s| s.fps).sum::<f64>() / samples.len() as f64
}

#[must_use]
pub fn count_drops(samples: &[FrameSample]) -> usize {
    samples.iter().filter(|s| s.fps < DROP_FPS).count()
}

/// `100 * (0.5 * gpu share + 0.3 * inverse complexity + 0.2 * inverse duration)`.
/// The duration penalty is capped at one half.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn power_efficiency(animations: &[AnimationDescriptor]) -> f64 {
    if animations.is_empty() {
        return 100.0;
    }
    let n = animations.len() as f64;
    let gpu = animations.iter().filter(|a| a.gpu_accelerated).count() as f64 / n;
    let avg_complexity = animations.iter().map(|a| a.complexity.weight()).sum::<f64>() / n;
    let avg_duration = animations.iter().map(|a| a.duration).sum::<f64>() / n;

    let complexity_term = 1.0 - (avg_complexity - 1.0) / 2.0;
    let duration_term = 1.0 - (avg_duration / 4000.0).min(0.5);
    100.0 * (0.5 * gpu + 0.3 * complexity_term + 0.2 * duration_term)
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn frame_rate_score(average_fps: f64, drops: usize) -> f64 {
    clamp_score(average_fps / TARGET_FPS * 100.0 - 2.0 * drops as f64)
}

/// Full marks within budget, one point lost per 100ms beyond it.
#[must_use]
pub fn duration_score(total_ms: f64, budget_ms: f64) -> f64 {
    if total_ms <= budget_ms {
        return 100.0;
    }
    clamp_score(100.0 - (total_ms - budget_ms) / 100.0)
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn complexity_score(animations: &[AnimationDescriptor]) -> f64 {
    let high = animations.iter().filter(|a| a.complexity == Complexity::High).count() as f64;
    let medium = animations.iter().filter(|a| a.complexity == Complexity::Medium).count() as f64;
    clamp_score(100.0 - 25.0 * high - 10.0 * medium)
}

/// Aggregates simulated animations into metrics with every sub-score filled.
#[must_use]
pub fn metrics(animations: Vec<AnimationDescriptor>, samples: &[FrameSample], config: &AnimationConfig) -> AnimationMetrics {
    let average_fps = mean_fps(samples);
    let frame_drops = count_drops(samples);
    let power = power_efficiency(&animations);
    let total_duration: f64 = animations.iter().map(|a| a.duration).sum();

    AnimationMetrics {
        animation_count: animations.len(),
        average_fps,
        frame_drops,
        power_efficiency: power,
        gpu_accelerated_count: animations.iter().filter(|a| a.gpu_accelerated).count(),
        total_duration,
        frame_rate_score: frame_rate_score(average_fps, frame_drops),
        power_score: clamp_score(power),
        duration_score: duration_score(total_duration, config.total_duration_budget_ms),
        complexity_score: complexity_score(&animations),
        animations,
        simulation_truncated: false,
        frames_path: None,
    }
}

#[must_use]
pub fn overall(m: &AnimationMetrics) -> f64 {
    clamp_score(0.4 * m.frame_rate_score + 0.2 * m.power_score + 0.2 * m.duration_score + 0.2 * m.complexity_score)
}

/// Emits animation issues in a fixed order.
#[must_use]
pub fn issues(m: &AnimationMetrics, config: &AnimationConfig) -> Vec<Issue> {
    let mut out = Vec::new();

    if m.average_fps < 45.0 {
        let severity = if m.average_fps < 30.0 { Severity::High } else { Severity::Medium };
        out.push(
            Issue::new(
                "animation-low-fps",
                "Low frame rate",
                format!("Animations average {:.1} fps (target 60)", m.average_fps),
                severity,
            )
            .recommend("Animate transform and opacity instead of layout properties")
            .recommend("Reduce the number of properties animated at once"),
        );
    }

    if m.frame_drops > 5 {
        let severity = if m.frame_drops > 10 { Severity::High } else { Severity::Medium };
        out.push(
            Issue::new(
                "animation-frame-drops",
                "Dropped frames",
                format!("{} simulated frames fell below 30 fps", m.frame_drops),
                severity,
            )
            .recommend("Avoid work on the main thread while animations run")
            .recommend("Promote animated elements to their own layer with will-change"),
        );
    }

    let slow: Vec<&AnimationDescriptor> = m.animations.iter().filter(|a| !a.gpu_accelerated).collect();
    if !slow.is_empty() {
        let severity = if slow.len() >= 3 { Severity::Medium } else { Severity::Low };
        let selectors: Vec<&str> = slow.iter().map(|a| a.selector.as_str()).collect();
        out.push(
            Issue::new(
                "animation-not-gpu-accelerated",
                "Animations not GPU accelerated",
                format!(
                    "{} animation(s) do not use transform or opacity: {}",
                    slow.len(),
                    selectors.join(", ")
                ),
                severity,
            )
            .recommend("Express motion with transform and fades with opacity"),
        );
    }

    for anim in m.animations.iter().filter(|a| a.duration > config.long_duration_ms) {
        out.push(
            Issue::new(
                format!("animation-long-duration-{}", anim.id),
                "Excessively long animation",
                format!(
                    "{} on {} runs for {:.0}ms (limit {:.0}ms)",
                    anim.kind.label(),
                    anim.selector,
                    anim.duration,
                    config.long_duration_ms
                ),
                Severity::Low,
            )
            .with_animation(anim.id.clone())
            .with_selector(anim.selector.clone())
            .recommend("Keep interface transitions between 150ms and 500ms"),
        );
    }

    if m.power_efficiency < 70.0 {
        let severity = if m.power_efficiency < 50.0 { Severity::Medium } else { Severity::Low };
        out.push(
            Issue::new(
                "animation-power-efficiency",
                "Poor power efficiency",
                format!("Power efficiency is {:.0}/100", m.power_efficiency),
                severity,
            )
            .recommend("Prefer short, compositor-only animations")
            .recommend("Honor prefers-reduced-motion"),
        );
    }

    if m.simulation_truncated {
        out.push(Issue::new(
            "animation-simulation-truncated",
            "Frame simulation truncated",
            format!(
                "Frame timing covers at most {:.0}s per animation and {} frames per component",
                super::simulate::MAX_SIMULATED_MS / 1000.0,
                super::simulate::MAX_TOTAL_FRAMES
            ),
            Severity::Info,
        ));
    }

    out
}
