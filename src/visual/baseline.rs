// src/visual/baseline.rs
//! Pixel comparison against accepted baseline screenshots.

use super::VisualState;
use crate::error::{Result, UxError};
use crate::output;
use crate::types::{Issue, Severity};
use crate::utils::file_sha256;
use image::{Rgba, RgbaImage};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Outcome of comparing one state's snapshot with its baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateComparison {
    pub state: VisualState,
    pub snapshot_path: PathBuf,
    pub baseline_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_path: Option<PathBuf>,
    /// Fraction of differing pixels, 0..1.
    pub difference: f64,
    /// `difference` exceeds the configured threshold.
    pub changed: bool,
    /// No baseline existed; the snapshot became the baseline.
    pub baseline_created: bool,
}

/// Fraction of pixels whose summed channel difference exceeds `tolerance`,
/// plus a diff image: differing pixels red, the rest a faded copy of `current`.
/// Pixels outside the overlap of differently sized images count as different.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn diff_images(current: &RgbaImage, baseline: &RgbaImage, tolerance: u32) -> (f64, RgbaImage) {
    let width = current.width().max(baseline.width());
    let height = current.height().max(baseline.height());
    let mut diff = RgbaImage::from_pixel(width, height, Rgba([255, 0, 0, 255]));
    if width == 0 || height == 0 {
        return (0.0, diff);
    }

    let mut differing: u64 = 0;
    for y in 0..height {
        for x in 0..width {
            let a = (x < current.width() && y < current.height()).then(|| current.get_pixel(x, y));
            let b = (x < baseline.width() && y < baseline.height()).then(|| baseline.get_pixel(x, y));
            match (a, b) {
                (Some(pa), Some(pb)) if channel_distance(pa, pb) <= tolerance => {
                    diff.put_pixel(x, y, faded(pa));
                }
                _ => differing += 1,
            }
        }
    }
    (differing as f64 / (u64::from(width) * u64::from(height)) as f64, diff)
}

fn channel_distance(a: &Rgba<u8>, b: &Rgba<u8>) -> u32 {
    a.0.iter()
        .zip(b.0.iter())
        .map(|(x, y)| u32::from(x.abs_diff(*y)))
        .sum()
}

fn faded(p: &Rgba<u8>) -> Rgba<u8> {
    let fade = |c: u8| 255 - (255 - c) / 4;
    Rgba([fade(p[0]), fade(p[1]), fade(p[2]), 255])
}

/// Compares a written snapshot with its baseline, creating the baseline when
/// missing. Byte-identical files skip decoding.
///
/// # Errors
/// Returns error if an image cannot be read, decoded or written.
pub fn compare(
    state: VisualState,
    snapshot: &Path,
    baseline: &Path,
    diff_path: &Path,
    threshold: f64,
    tolerance: u32,
) -> Result<StateComparison> {
    let mut result = StateComparison {
        state,
        snapshot_path: snapshot.to_path_buf(),
        baseline_path: baseline.to_path_buf(),
        diff_path: None,
        difference: 0.0,
        changed: false,
        baseline_created: false,
    };

    if !baseline.exists() {
        copy_file(snapshot, baseline)?;
        info!(baseline = %baseline.display(), "created baseline");
        result.baseline_created = true;
        return Ok(result);
    }

    if file_sha256(snapshot)? == file_sha256(baseline)? {
        debug!(state = %state, "snapshot identical to baseline");
        return Ok(result);
    }

    let current = image::open(snapshot)?.to_rgba8();
    let accepted = image::open(baseline)?.to_rgba8();
    let (difference, diff) = diff_images(&current, &accepted, tolerance);
    if difference > 0.0 {
        output::write_png(diff_path, &diff)?;
        result.diff_path = Some(diff_path.to_path_buf());
    }
    result.difference = difference;
    result.changed = difference > threshold;
    Ok(result)
}

/// Copies `from` over `to`, creating parent directories.
///
/// # Errors
/// Returns error if the source is missing or the copy fails.
pub fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if !from.exists() {
        return Err(UxError::io(
            std::io::Error::new(std::io::ErrorKind::NotFound, "snapshot not found"),
            from,
        ));
    }
    if let Some(parent) = to.parent() {
        output::ensure_dir(parent)?;
    }
    fs::copy(from, to).map_err(|e| UxError::io(e, to))?;
    Ok(())
}

/// One WARNING per state whose difference exceeds the threshold.
#[must_use]
pub fn regression_issues(comparisons: &[StateComparison], threshold: f64) -> Vec<Issue> {
    comparisons
        .iter()
        .filter(|c| c.changed)
        .map(|c| {
            Issue::new(
                format!("visual-regression-{}", c.state.slug()),
                format!("Visual change in {} state", c.state.slug()),
                format!(
                    "{:.1}% of pixels differ from the baseline (threshold {:.1}%)",
                    c.difference * 100.0,
                    threshold * 100.0
                ),
                Severity::Warning,
            )
            .recommend("Review the diff image and accept the new baseline if the change is intended")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn solid(w: u32, h: u32, c: [u8; 3]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([c[0], c[1], c[2], 255]))
    }

    #[test]
    fn identical_images_do_not_differ() {
        let (d, _) = diff_images(&solid(4, 4, [10, 10, 10]), &solid(4, 4, [10, 10, 10]), 0);
        assert!(d.abs() < f64::EPSILON);
    }

    #[test]
    fn tolerance_absorbs_small_changes() {
        let (d, _) = diff_images(&solid(4, 4, [10, 10, 10]), &solid(4, 4, [12, 12, 12]), 32);
        assert!(d.abs() < f64::EPSILON);
        let (d, _) = diff_images(&solid(4, 4, [10, 10, 10]), &solid(4, 4, [200, 10, 10]), 32);
        assert!((d - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn size_mismatch_counts_as_difference() {
        let (d, diff) = diff_images(&solid(4, 2, [0, 0, 0]), &solid(4, 4, [0, 0, 0]), 0);
        assert!((d - 0.5).abs() < f64::EPSILON);
        assert_eq!(diff.dimensions(), (4, 4));
        assert_eq!(diff.get_pixel(0, 3), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn missing_baseline_is_created_then_matched() -> Result<()> {
        let dir = tempdir()?;
        let snap = dir.path().join("snap.png");
        let base = dir.path().join("base").join("default.png");
        let diff = dir.path().join("diff.png");
        output::write_png(&snap, &solid(8, 8, [1, 2, 3]))?;

        let first = compare(VisualState::Default, &snap, &base, &diff, 0.1, 32)?;
        assert!(first.baseline_created);
        assert!(base.exists());

        let second = compare(VisualState::Default, &snap, &base, &diff, 0.1, 32)?;
        assert!(!second.baseline_created);
        assert!(!second.changed);
        assert!(second.diff_path.is_none());
        Ok(())
    }

    #[test]
    fn changed_state_writes_diff_and_issue() -> Result<()> {
        let dir = tempdir()?;
        let snap = dir.path().join("snap.png");
        let base = dir.path().join("base.png");
        let diff = dir.path().join("d").join("hover.png");
        output::write_png(&base, &solid(8, 8, [255, 255, 255]))?;
        output::write_png(&snap, &solid(8, 8, [0, 0, 0]))?;

        let c = compare(VisualState::Hover, &snap, &base, &diff, 0.1, 32)?;
        assert!(c.changed);
        assert!(diff.exists());
        let issues = regression_issues(&[c], 0.1);
        assert_eq!(issues[0].id, "visual-regression-hover");
        assert_eq!(issues[0].severity, Severity::Warning);
        Ok(())
    }
}
