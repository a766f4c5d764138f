// src/config/mod.rs
pub mod types;

pub use self::types::{AnimationConfig, CognitiveConfig, Config, TokenConfig, VisualConfig};
use crate::cognitive::tasks::MAX_CHARS_PER_FIELD;
use crate::error::{Result, UxError};
use crate::types::Dimension;
use crate::visual::browser::{MAX_PAGE_HEIGHT, MAX_VIEWPORT_WIDTH};
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up by [`Config::load`].
pub const CONFIG_FILE: &str = "ux-enhancer.toml";

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `ux-enhancer.toml` from the working directory, falling back to defaults.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Loads a config file. A missing file yields defaults.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| UxError::io(e, path))?;
        Self::from_toml_str(&content)
    }

    /// Parses TOML text. Missing keys take their defaults.
    ///
    /// # Errors
    /// Returns error on malformed TOML.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Validates configuration.
    ///
    /// # Errors
    /// Returns `UxError::Config` naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(invalid("output_dir must not be empty"));
        }
        if self.max_workers == 0 {
            return Err(invalid("max_workers must be at least 1"));
        }
        if self.analysis_timeout_ms == 0 {
            return Err(invalid("analysis_timeout_ms must be positive"));
        }
        if self.tokens.ideal_ratio <= 0.0 {
            return Err(invalid("tokens.ideal_ratio must be positive"));
        }
        if self.tokens.group_distance < 0.0 || self.tokens.similar_distance < 0.0 {
            return Err(invalid("token color distances must not be negative"));
        }
        if !is_positive(self.animation.default_duration_ms) {
            return Err(invalid("animation.default_duration_ms must be a positive number"));
        }
        if !is_positive(self.animation.long_duration_ms) || !is_positive(self.animation.total_duration_budget_ms) {
            return Err(invalid("animation duration limits must be positive numbers"));
        }
        if self.cognitive.assumed_chars_per_field > MAX_CHARS_PER_FIELD {
            return Err(UxError::Config(format!(
                "cognitive.assumed_chars_per_field must be at most {MAX_CHARS_PER_FIELD}"
            )));
        }
        if self.visual.viewports.is_empty()
            || self.visual.viewports.iter().any(|w| !(1..=MAX_VIEWPORT_WIDTH).contains(w))
        {
            return Err(UxError::Config(format!(
                "visual.viewports must list widths within [1, {MAX_VIEWPORT_WIDTH}]"
            )));
        }
        if !(1..=MAX_PAGE_HEIGHT).contains(&self.visual.viewport_height) {
            return Err(UxError::Config(format!(
                "visual.viewport_height must be within [1, {MAX_PAGE_HEIGHT}]"
            )));
        }
        if !(0.0..=1.0).contains(&self.visual.diff_threshold) {
            return Err(invalid("visual.diff_threshold must be within [0, 1]"));
        }
        Ok(())
    }

    #[must_use]
    pub fn is_enabled(&self, dimension: Dimension) -> bool {
        self.enabled.contains(&dimension)
    }

    /// Removes a dimension from the enabled set.
    pub fn disable(&mut self, dimension: Dimension) {
        self.enabled.retain(|d| *d != dimension);
    }

    /// Output directory owned by one analyzer.
    #[must_use]
    pub fn dimension_dir(&self, dimension: Dimension) -> PathBuf {
        self.output_dir.join(dimension.slug())
    }

    #[must_use]
    pub fn baseline_dir(&self) -> PathBuf {
        self.visual
            .baseline_dir
            .clone()
            .unwrap_or_else(|| self.output_dir.join("baselines"))
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn invalid(msg: &str) -> UxError {
    UxError::Config(msg.to_string())
}
