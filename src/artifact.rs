// src/artifact.rs
//! Component artifacts: the immutable unit of analysis.

use crate::error::{Result, UxError};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Source text for one facet of a component, inline or backed by a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "value")]
pub enum Source {
    Inline(String),
    File(PathBuf),
}

impl Source {
    /// Loads the text. File sources are read on every call.
    ///
    /// # Errors
    /// Returns error if a file source cannot be read.
    pub fn load(&self) -> Result<Cow<'_, str>> {
        match self {
            Self::Inline(text) => Ok(Cow::Borrowed(text)),
            Self::File(path) => fs::read_to_string(path)
                .map(Cow::Owned)
                .map_err(|e| UxError::io(e, path)),
        }
    }
}

impl From<&str> for Source {
    fn from(text: &str) -> Self {
        Self::Inline(text.to_string())
    }
}

impl From<String> for Source {
    fn from(text: String) -> Self {
        Self::Inline(text)
    }
}

/// A UI component as seen by the analyzers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentArtifact {
    pub component_id: String,
    pub markup: Option<Source>,
    pub style: Option<Source>,
    pub script: Option<Source>,
}

impl ComponentArtifact {
    #[must_use]
    pub fn new(component_id: impl Into<String>) -> Self {
        Self {
            component_id: component_id.into(),
            markup: None,
            style: None,
            script: None,
        }
    }

    #[must_use]
    pub fn with_markup(mut self, source: impl Into<Source>) -> Self {
        self.markup = Some(source.into());
        self
    }

    #[must_use]
    pub fn with_style(mut self, source: impl Into<Source>) -> Self {
        self.style = Some(source.into());
        self
    }

    #[must_use]
    pub fn with_script(mut self, source: impl Into<Source>) -> Self {
        self.script = Some(source.into());
        self
    }

    /// Builds an artifact from a component file and its siblings.
    ///
    /// The file itself is the markup; JSX, TSX and Vue files double as script.
    /// Stylesheets and scripts in the same directory that share the file stem
    /// (`Button.css`, `Button.module.scss`, `Button.js`) are attached. When
    /// several stylesheets match, the first in name order wins.
    ///
    /// # Errors
    /// Returns error if the path has no file stem or its directory cannot be listed.
    pub fn from_path(path: &Path) -> Result<Self> {
        let stem = component_stem(path)
            .ok_or_else(|| UxError::Parse(format!("no file stem in {}", path.display())))?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let mut artifact = Self::new(stem.clone()).with_markup(Source::File(path.to_path_buf()));
        if matches!(ext.as_str(), "tsx" | "jsx" | "vue") {
            artifact.script = Some(Source::File(path.to_path_buf()));
        }

        for sibling in siblings(path)? {
            if sibling == path || component_stem(&sibling).as_deref() != Some(stem.as_str()) {
                continue;
            }
            let sibling_ext = sibling
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase)
                .unwrap_or_default();
            match sibling_ext.as_str() {
                "css" | "scss" | "sass" | "less" if artifact.style.is_none() => {
                    artifact.style = Some(Source::File(sibling));
                }
                "js" | "ts" | "mjs" if artifact.script.is_none() => {
                    artifact.script = Some(Source::File(sibling));
                }
                _ => {}
            }
        }

        Ok(artifact)
    }

    /// Returns a filesystem-safe form of the component id.
    #[must_use]
    pub fn file_stem(&self) -> String {
        sanitize_id(&self.component_id)
    }
}

/// Replaces anything outside `[A-Za-z0-9_-]` with `_`.
#[must_use]
pub fn sanitize_id(id: &str) -> String {
    let cleaned: String = id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "component".to_string()
    } else {
        cleaned
    }
}

/// `Button.module.css` and `Button.tsx` both have stem `Button`.
fn component_stem(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let stem = name.split('.').next()?;
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}

fn siblings(path: &Path) -> Result<Vec<PathBuf>> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut found = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            found.push(entry.into_path());
        }
    }
    Ok(found)
}
