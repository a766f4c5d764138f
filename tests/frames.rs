// tests/frames.rs
//! Frame-trace invariants.

use ux_enhancer_core::animation::{AnimationAnalyzer, FrameTrace};
use ux_enhancer_core::config::AnimationConfig;

fn assert_consistent(trace: &FrameTrace) {
    if trace.timestamps.len() < 2 {
        assert!(trace.frame_deltas.is_empty());
        assert!(trace.average_fps.abs() < f64::EPSILON);
        return;
    }
    assert_eq!(trace.frame_deltas.len(), trace.timestamps.len() - 1);
    assert!((0.0..=1000.0).contains(&trace.average_fps));
    let mean = trace.frame_deltas.iter().sum::<f64>() / trace.frame_deltas.len() as f64;
    if mean > 1.0 {
        assert!((trace.average_fps - 1000.0 / mean).abs() < 1e-6);
    }
}

#[test]
fn parsed_traces_keep_delta_invariant() {
    for text in ["[0, 16.7, 33.4, 50.1]", "0 16 32 48 64", "0,20,40", "[{\"timestamp\": 5}, {\"timestamp\": 21}]", "[]", "7"] {
        let trace = FrameTrace::parse(text).expect(text);
        assert_consistent(&trace);
    }
}

#[test]
fn sixty_hertz_trace_reads_sixty_fps() {
    let stamps: Vec<f64> = (0..61).map(|i| f64::from(i) * 1000.0 / 60.0).collect();
    let trace = FrameTrace::from_timestamps(&stamps);
    assert!((trace.average_fps - 60.0).abs() < 1e-6);
}

#[test]
fn simulated_frames_satisfy_the_same_invariant() {
    let css = ".a { transition: transform 400ms; } .b { animation: pulse 900ms; } @keyframes pulse { opacity: 0.5 }";
    let samples = AnimationAnalyzer::new(AnimationConfig::default(), Some(4))
        .track_frame_rate("", css, "", "c")
        .expect("frames");
    assert!(!samples.is_empty());
    assert!(samples.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    assert_consistent(&FrameTrace::from_samples(&samples));
}

#[test]
fn malformed_trace_is_rejected() {
    assert!(FrameTrace::parse("0 16 banana").is_err());
}
