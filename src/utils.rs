// src/utils.rs
use crate::error::{Result, UxError};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// Hex SHA-256 of raw bytes.
#[must_use]
pub fn compute_sha256(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Hex SHA-256 of a file's contents.
///
/// # Errors
/// Returns error if the file cannot be read.
pub fn file_sha256(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| UxError::io(e, path))?;
    Ok(compute_sha256(&bytes))
}
