//! Configuration management
//!
//! Handles loading, validation, and merging of configuration from:
//! - TOML files
//! - Environment variables
//! - CLI arguments

use anyhow::{Context, Result};
use image::imageops::FilterType;
use image::Rgb;
use serde::{Deserialize, Serialize};

use crate::analysis::DiffOptions;
use crate::raster;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Analysis configuration
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Analysis tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Per-channel difference a pixel must strictly exceed to count
    pub threshold: u8,
    /// Resampling filter for size-mismatched inputs
    /// (nearest|triangle|catmullrom|gaussian|lanczos3)
    pub resample_filter: String,
    /// RGB color painted over differing pixels in the overlay
    pub highlight: [u8; 3],
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            threshold: 10,
            resample_filter: "lanczos3".to_string(),
            highlight: [255, 0, 0],
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level when RUST_LOG is not set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Create default configuration
    pub fn default_config() -> Self {
        Config {
            analysis: AnalysisConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if raster::filter_from_name(&self.analysis.resample_filter).is_none() {
            anyhow::bail!(
                "Invalid resample filter: {}",
                self.analysis.resample_filter
            );
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Invalid log level: {}", self.logging.level),
        }

        Ok(())
    }

    /// Override config with CLI arguments
    pub fn with_overrides(mut self, threshold: Option<u8>) -> Self {
        if let Some(threshold) = threshold {
            self.analysis.threshold = threshold;
        }
        self
    }

    /// Analysis options derived from this configuration
    pub fn diff_options(&self) -> DiffOptions {
        DiffOptions {
            threshold: self.analysis.threshold,
            highlight: Rgb(self.analysis.highlight),
            filter: raster::filter_from_name(&self.analysis.resample_filter)
                .unwrap_or(FilterType::Lanczos3),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default_config();
        assert_eq!(config.analysis.threshold, 10);
        assert_eq!(config.analysis.resample_filter, "lanczos3");
        assert_eq!(config.analysis.highlight, [255, 0, 0]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_filter() {
        let mut config = Config::default_config();
        config.analysis.resample_filter = "bicubic".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_invalid_level() {
        let mut config = Config::default_config();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.analysis.threshold, 10);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_toml_overrides_section() {
        let config: Config = toml::from_str(
            r#"
            [analysis]
            threshold = 25
            resample_filter = "nearest"
            highlight = [0, 255, 0]
            "#,
        )
        .unwrap();

        assert_eq!(config.analysis.threshold, 25);
        assert_eq!(config.analysis.resample_filter, "nearest");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_with_overrides() {
        let config = Config::default_config().with_overrides(Some(30));
        assert_eq!(config.analysis.threshold, 30);

        let config = Config::default_config().with_overrides(None);
        assert_eq!(config.analysis.threshold, 10);
    }

    #[test]
    fn test_diff_options_mapping() {
        let mut config = Config::default_config();
        config.analysis.threshold = 5;
        config.analysis.highlight = [0, 0, 255];

        let options = config.diff_options();
        assert_eq!(options.threshold, 5);
        assert_eq!(options.highlight, Rgb([0, 0, 255]));
    }
}
