#![forbid(unsafe_code)]

//! Shelf configuration as data.
//!
//! [`ShelfConfig`] groups the pixel metrics, interaction thresholds, and sync
//! timing. Every field has a default matching the stock shelf, so an empty
//! file yields `ShelfConfig::default()`.
//!
//! ```toml
//! [metrics]
//! item_width = 96.0
//!
//! [interaction]
//! click_threshold_px = 4.0
//! vacated_cell = "reusable"
//!
//! [sync]
//! debounce_ms = 500
//! ```
//!
//! ```rust,ignore
//! let config = ShelfConfig::from_toml_file("shelf.toml")?.validated()?;
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use shelfgrid_layout::{GridMetrics, VacatedCell};
use web_time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShelfConfig {
    /// Pixel geometry of the shelf drawing.
    pub metrics: GridMetrics,
    pub interaction: InteractionConfig,
    pub sync: SyncConfig,
}

/// Pointer interaction tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// A selection rectangle smaller than this in both dimensions is a click.
    pub click_threshold_px: f64,
    /// Whether push chains may flow into the dragged item's committed cell.
    pub vacated_cell: VacatedCell,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            click_threshold_px: 5.0,
            vacated_cell: VacatedCell::Pinned,
        }
    }
}

/// Persistence timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Quiet period after the last commit before the layout is written.
    pub debounce_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { debounce_ms: 800 }
    }
}

impl SyncConfig {
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl ShelfConfig {
    /// Load from a TOML string.
    #[cfg(feature = "toml-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "toml-config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let m = &self.metrics;

        for (name, value) in [("item_width", m.item_width), ("item_height", m.item_height)] {
            if !value.is_finite() || value <= 0.0 {
                errors.push(format!("metrics.{name} must be a positive number, got {value}"));
            }
        }
        for (name, value) in [("top_gap", m.top_gap), ("frame", m.frame)] {
            if !value.is_finite() || value < 0.0 {
                errors.push(format!("metrics.{name} must be >= 0, got {value}"));
            }
        }

        let threshold = self.interaction.click_threshold_px;
        if !threshold.is_finite() || threshold < 0.0 {
            errors.push(format!(
                "interaction.click_threshold_px must be >= 0, got {threshold}"
            ));
        }

        errors
    }

    /// `self` if [`validate`](Self::validate) reports nothing.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Errors that can occur when loading a shelf configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "toml-config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "toml-config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "toml-config")]
            Self::Toml(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_shelf() {
        let config = ShelfConfig::default();
        assert_eq!(config.metrics.item_width, 80.0);
        assert_eq!(config.metrics.item_height, 120.0);
        assert_eq!(config.metrics.top_gap, 25.0);
        assert_eq!(config.metrics.frame, 15.0);
        assert_eq!(config.interaction.click_threshold_px, 5.0);
        assert_eq!(config.interaction.vacated_cell, VacatedCell::Pinned);
        assert_eq!(config.sync.debounce(), Duration::from_millis(800));
        assert!(config.validate().is_empty());
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = ShelfConfig::from_toml_str(
            r#"
            [metrics]
            item_width = 96.0

            [interaction]
            vacated_cell = "reusable"
            "#,
        )
        .unwrap();
        assert_eq!(config.metrics.item_width, 96.0);
        assert_eq!(config.metrics.item_height, 120.0);
        assert_eq!(config.interaction.vacated_cell, VacatedCell::Reusable);
        assert_eq!(config.interaction.click_threshold_px, 5.0);
        assert_eq!(config.sync.debounce_ms, 800);
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn empty_toml_is_default() {
        assert_eq!(ShelfConfig::from_toml_str("").unwrap(), ShelfConfig::default());
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn toml_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shelf.toml");
        std::fs::write(&path, "[sync]\ndebounce_ms = 250\n").unwrap();
        let config = ShelfConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.sync.debounce_ms, 250);
    }

    #[test]
    fn json_loading() {
        let config =
            ShelfConfig::from_json_str(r#"{"interaction": {"click_threshold_px": 2.5}}"#).unwrap();
        assert_eq!(config.interaction.click_threshold_px, 2.5);
        assert_eq!(config.metrics, GridMetrics::default());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shelf.json");
        std::fs::write(&path, r#"{"sync": {"debounce_ms": 10}}"#).unwrap();
        assert_eq!(ShelfConfig::from_json_file(&path).unwrap().sync.debounce_ms, 10);
    }

    #[test]
    fn loader_errors() {
        assert!(matches!(
            ShelfConfig::from_json_str("{ nope"),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            ShelfConfig::from_json_file("/definitely/not/here.json"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn validation_catches_bad_values() {
        let mut config = ShelfConfig::default();
        config.metrics.item_width = 0.0;
        config.metrics.frame = -1.0;
        config.interaction.click_threshold_px = f64::NAN;
        let errors = config.validate();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].contains("item_width"));

        let err = config.validated().unwrap_err();
        assert!(err.to_string().starts_with("validation errors:"));
    }
}
