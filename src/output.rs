// src/output.rs
//! Artifact writers. Parent directories are created before every write so
//! callers never need to prepare the output tree.

use crate::error::{Result, UxError};
use image::RgbaImage;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Creates `dir` and its parents. Succeeds if it already exists.
///
/// # Errors
/// Returns error if the directory cannot be created.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| UxError::io(e, dir))
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

/// Writes `value` as pretty JSON.
///
/// # Errors
/// Returns error on serialization or filesystem failure.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let body = serde_json::to_string_pretty(value)?;
    write_bytes(path, body.as_bytes())
}

/// # Errors
/// Returns error on filesystem failure.
pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, bytes).map_err(|e| UxError::io(e, path))?;
    debug!(path = %path.display(), bytes = bytes.len(), "wrote artifact");
    Ok(())
}

/// # Errors
/// Returns error on encoding or filesystem failure.
pub fn write_png(path: &Path, image: &RgbaImage) -> Result<()> {
    ensure_parent(path)?;
    image.save_with_format(path, image::ImageFormat::Png)?;
    debug!(path = %path.display(), width = image.width(), height = image.height(), "wrote image");
    Ok(())
}
