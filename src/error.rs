// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UxError {
    #[error("I/O error: {source} (path: {path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Render failed: {0}")]
    Render(String),

    #[error("Analysis timed out after {ms}ms")]
    Timeout { ms: u64 },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, UxError>;

impl UxError {
    /// Wraps an I/O error with the path that produced it.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        UxError::Io {
            source,
            path: path.into(),
        }
    }
}

// Allow `?` on std::io::Error by converting to UxError::Io with unknown path.
impl From<std::io::Error> for UxError {
    fn from(source: std::io::Error) -> Self {
        UxError::Io {
            source,
            path: PathBuf::from("<unknown>"),
        }
    }
}

// Gracefully convert WalkDir errors
impl From<walkdir::Error> for UxError {
    fn from(e: walkdir::Error) -> Self {
        let path = e.path().map(PathBuf::from).unwrap_or_default();
        match e.into_io_error() {
            Some(source) => UxError::Io { source, path },
            None => UxError::Parse("filesystem loop while discovering siblings".to_string()),
        }
    }
}
