// src/animation/simulate.rs
//! Frame-timing simulation. Nothing is rendered; frames are synthesized from
//! the animation's type and complexity with an injected random source.

use super::{AnimationDescriptor, Complexity, FrameSample};
use rand::Rng;

/// Display refresh interval the simulation targets.
pub const FRAME_BUDGET_MS: f64 = 1000.0 / 60.0;

/// Samples below this rate count as dropped frames.
pub const DROP_FPS: f64 = 30.0;

/// Longest stretch of one animation that is simulated.
pub const MAX_SIMULATED_MS: f64 = 60_000.0;

/// Frames in [`MAX_SIMULATED_MS`]; the per-animation ceiling.
pub const MAX_FRAMES: usize = 3600;

/// Ceiling on frames across all animations of one component.
pub const MAX_TOTAL_FRAMES: usize = 100_000;

/// Base fps for the type, lowered by complexity with per-level floors.
#[must_use]
pub fn adjusted_fps(anim: &AnimationDescriptor) -> f64 {
    let base = anim.kind.base_fps();
    match anim.complexity {
        Complexity::High => (base - 15.0).max(30.0),
        Complexity::Medium => (base - 5.0).max(40.0),
        Complexity::Low => base,
    }
}

/// Relative jitter applied to each frame time.
#[must_use]
pub const fn jitter(complexity: Complexity) -> f64 {
    match complexity {
        Complexity::Low => 0.05,
        Complexity::Medium => 0.10,
        Complexity::High => 0.20,
    }
}

/// Probability that a frame takes twice as long.
#[must_use]
pub const fn drop_probability(complexity: Complexity) -> f64 {
    match complexity {
        Complexity::Low => 0.01,
        Complexity::Medium => 0.03,
        Complexity::High => 0.08,
    }
}

/// Number of frames a display would show over `duration_ms`, between one and
/// [`MAX_FRAMES`]. Non-finite or negative durations get one frame.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn frame_count(duration_ms: f64) -> usize {
    if !duration_ms.is_finite() || duration_ms <= 0.0 {
        return 1;
    }
    ((duration_ms.min(MAX_SIMULATED_MS) / FRAME_BUDGET_MS).round() as usize).clamp(1, MAX_FRAMES)
}

/// True when [`frame_count`] cuts the animation short.
#[must_use]
pub fn is_truncated(duration_ms: f64) -> bool {
    !duration_ms.is_finite() || duration_ms > MAX_SIMULATED_MS
}

/// Synthesizes up to `limit` frame samples for one animation, starting at
/// `start_ms`.
pub fn simulate<R: Rng + ?Sized>(anim: &AnimationDescriptor, start_ms: f64, limit: usize, rng: &mut R) -> Vec<FrameSample> {
    let target = 1000.0 / adjusted_fps(anim);
    let spread = jitter(anim.complexity);
    let drop_p = drop_probability(anim.complexity);

    let mut now = start_ms;
    (0..frame_count(anim.duration).min(limit))
        .map(|_| {
            let mut frame_duration = target * (1.0 + rng.gen_range(-spread..=spread));
            if rng.gen_bool(drop_p) {
                frame_duration *= 2.0;
            }
            now += frame_duration;
            FrameSample {
                timestamp: now,
                frame_duration,
                fps: 1000.0 / frame_duration,
            }
        })
        .collect()
}
