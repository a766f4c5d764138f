// src/animation/frames.rs
//! Frame traces built from explicit timestamp sequences.

use super::FrameSample;
use crate::error::{Result, UxError};
use serde::{Deserialize, Serialize};

/// Upper bound reported for average fps.
pub const MAX_FPS: f64 = 1000.0;

/// Sorted timestamps and the gaps between them.
///
/// `frame_deltas.len() == timestamps.len() - 1` whenever there is at least one
/// timestamp, and `average_fps == clamp(1000 / mean(frame_deltas), 0, 1000)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameTrace {
    pub timestamps: Vec<f64>,
    pub frame_deltas: Vec<f64>,
    pub average_fps: f64,
}

impl FrameTrace {
    /// Builds a trace. Non-finite values are dropped and the rest sorted.
    #[must_use]
    pub fn from_timestamps(raw: &[f64]) -> Self {
        let mut timestamps: Vec<f64> = raw.iter().copied().filter(|t| t.is_finite()).collect();
        timestamps.sort_by(f64::total_cmp);

        let frame_deltas: Vec<f64> = timestamps.windows(2).map(|w| w[1] - w[0]).collect();
        let average_fps = average_fps(&frame_deltas);

        Self {
            timestamps,
            frame_deltas,
            average_fps,
        }
    }

    /// Trace of simulated samples. The start of the first frame is included so
    /// every sample contributes one delta.
    #[must_use]
    pub fn from_samples(samples: &[FrameSample]) -> Self {
        let mut timestamps = Vec::with_capacity(samples.len() + 1);
        if let Some(first) = samples.first() {
            timestamps.push(first.timestamp - first.frame_duration);
        }
        timestamps.extend(samples.iter().map(|s| s.timestamp));
        Self::from_timestamps(&timestamps)
    }

    /// Parses a JSON array of numbers, a JSON array of `{ "timestamp": n }`
    /// objects, or plain numbers separated by commas or whitespace.
    ///
    /// # Errors
    /// Returns `UxError::Parse` if any entry is not a number.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        if trimmed.starts_with('[') {
            let values: Vec<serde_json::Value> = serde_json::from_str(trimmed)?;
            let stamps = values
                .iter()
                .map(json_timestamp)
                .collect::<Result<Vec<_>>>()?;
            return Ok(Self::from_timestamps(&stamps));
        }

        let stamps = trimmed
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<f64>()
                    .map_err(|_| UxError::Parse(format!("not a timestamp: {s}")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_timestamps(&stamps))
    }

    #[must_use]
    pub fn mean_delta(&self) -> Option<f64> {
        mean(&self.frame_deltas)
    }
}

fn json_timestamp(value: &serde_json::Value) -> Result<f64> {
    value
        .as_f64()
        .or_else(|| value.get("timestamp").and_then(serde_json::Value::as_f64))
        .ok_or_else(|| UxError::Parse(format!("not a timestamp: {value}")))
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn average_fps(deltas: &[f64]) -> f64 {
    match mean(deltas) {
        None => 0.0,
        Some(m) if m <= 0.0 => MAX_FPS,
        Some(m) => (1000.0 / m).clamp(0.0, MAX_FPS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deltas_are_one_shorter_than_timestamps() {
        let t = FrameTrace::from_timestamps(&[0.0, 16.0, 33.0, 50.0]);
        assert_eq!(t.frame_deltas.len(), t.timestamps.len() - 1);
        let expected = 1000.0 / (50.0 / 3.0);
        assert!((t.average_fps - expected).abs() < 1e-9);
    }

    #[test]
    fn degenerate_traces_stay_in_bounds() {
        assert!(FrameTrace::from_timestamps(&[]).average_fps.abs() < f64::EPSILON);
        assert!(FrameTrace::from_timestamps(&[5.0]).frame_deltas.is_empty());
        let same = FrameTrace::from_timestamps(&[3.0, 3.0, 3.0]);
        assert!((same.average_fps - MAX_FPS).abs() < f64::EPSILON);
    }

    #[test]
    fn unordered_input_is_sorted() {
        let t = FrameTrace::from_timestamps(&[32.0, 0.0, 16.0, f64::NAN]);
        assert_eq!(t.timestamps, vec![0.0, 16.0, 32.0]);
        assert_eq!(t.frame_deltas, vec![16.0, 16.0]);
    }

    #[test]
    fn parses_all_supported_shapes() {
        let a = FrameTrace::parse("[0, 16.7, 33.4]").unwrap();
        let b = FrameTrace::parse("[{\"timestamp\": 0}, {\"timestamp\": 16.7}, {\"timestamp\": 33.4}]").unwrap();
        let c = FrameTrace::parse("0, 16.7\n33.4").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn rejects_non_numeric_entries() {
        assert!(matches!(FrameTrace::parse("0 16 abc"), Err(UxError::Parse(_))));
        assert!(FrameTrace::parse("[\"x\"]").is_err());
    }

    #[test]
    fn samples_keep_every_frame_delta() {
        let samples = vec![
            FrameSample { timestamp: 16.0, frame_duration: 16.0, fps: 62.5 },
            FrameSample { timestamp: 48.0, frame_duration: 32.0, fps: 31.25 },
        ];
        let t = FrameTrace::from_samples(&samples);
        assert_eq!(t.frame_deltas, vec![16.0, 32.0]);
        assert!((t.average_fps - 1000.0 / 24.0).abs() < 1e-9);
    }
}
