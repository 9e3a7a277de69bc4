//! Configuration for the solver application.
//!
//! Loads settings from config.json at startup. Provides the OCR threshold,
//! capture timing, history options and the solver's tunable thresholds.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

use crate::solver::SolverSettings;

/// Global configuration instance, initialized once at startup.
static CONFIG: OnceLock<AppConfig> = OnceLock::new();

pub const THRESHOLD_MIN: u8 = 50;
pub const THRESHOLD_MAX: u8 = 200;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("OCR threshold must be between 50 and 200, got {0}")]
    ThresholdOutOfRange(i64),
}

/// Binarization cutoff fed to the OCR preprocessing, always within 50..=200.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Threshold(u8);

impl Threshold {
    pub fn new(value: i64) -> Result<Self, ConfigError> {
        if (THRESHOLD_MIN as i64..=THRESHOLD_MAX as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ConfigError::ThresholdOutOfRange(value))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Binarization threshold for OCR (50-200)
    pub ocr_threshold: i64,
    /// Frames whose operation has fewer numbers than this are skipped (1-10)
    pub min_numbers_required: usize,
    /// Only confident tokens form the combined-text fallback
    pub high_confidence_mode: bool,
    /// ADB screenshot timeout (1-30 seconds)
    pub capture_timeout_secs: u64,
    /// Delay between frames (100-10000 milliseconds)
    pub solve_interval_ms: u64,
    /// Append every solved problem to the history CSV
    pub auto_save_history: bool,
    /// History entries shown at startup
    pub max_history_entries: usize,
    /// Read every binary operation as a division
    pub division_mode: bool,
    pub solver: SolverSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ocr_threshold: 100,
            min_numbers_required: 2,
            high_confidence_mode: false,
            capture_timeout_secs: 5,
            solve_interval_ms: 1000,
            auto_save_history: true,
            max_history_entries: 1000,
            division_mode: false,
            solver: SolverSettings::default(),
        }
    }
}

impl AppConfig {
    /// Checks every range and returns one message per problem.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if let Err(e) = self.threshold() {
            issues.push(e.to_string());
        }
        if !(1..=10).contains(&self.min_numbers_required) {
            issues.push("Min numbers required must be between 1 and 10".to_string());
        }
        if !(1..=30).contains(&self.capture_timeout_secs) {
            issues.push("Capture timeout must be between 1 and 30 seconds".to_string());
        }
        if !(100..=10000).contains(&self.solve_interval_ms) {
            issues.push("Solve interval must be between 100 and 10000 milliseconds".to_string());
        }
        if self.max_history_entries == 0 {
            issues.push("Max history entries must be at least 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.solver.min_math_ratio) {
            issues.push("Math ratio must be between 0.0 and 1.0".to_string());
        }

        issues
    }

    /// The OCR threshold; out-of-range values are a hard error.
    pub fn threshold(&self) -> Result<Threshold, ConfigError> {
        Threshold::new(self.ocr_threshold)
    }

    /// Writes the configuration as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }
}

/// Loads configuration from `path` or returns defaults.
///
/// Missing keys take their default value.
pub fn load_config(path: &Path) -> AppConfig {
    crate::log(&format!("Looking for config at: {}", path.display()));

    if path.exists() {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    crate::log("Config loaded from config.json");
                    return config;
                }
                Err(e) => {
                    crate::log(&format!(
                        "Failed to parse config.json: {}. Using defaults.",
                        e
                    ));
                }
            },
            Err(e) => {
                crate::log(&format!(
                    "Failed to read config.json: {}. Using defaults.",
                    e
                ));
            }
        }
    } else {
        crate::log("config.json not found. Using default config.");
    }

    AppConfig::default()
}

/// Initializes the global configuration from config.json next to the executable.
pub fn init_config() {
    let _ = CONFIG.set(load_config(&crate::paths::get_config_path()));
}

/// Returns the global configuration, or defaults if `init_config` never ran.
pub fn get_config() -> &'static AppConfig {
    CONFIG.get_or_init(AppConfig::default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_empty());
        assert_eq!(config.threshold().unwrap().value(), 100);
        assert_eq!(config.solver.ui_corner_size, 150);
    }

    #[test]
    fn test_threshold_range() {
        assert!(Threshold::new(50).is_ok());
        assert!(Threshold::new(200).is_ok());
        assert_eq!(Threshold::new(49), Err(ConfigError::ThresholdOutOfRange(49)));
        assert_eq!(Threshold::new(201), Err(ConfigError::ThresholdOutOfRange(201)));
        assert_eq!(Threshold::new(-5), Err(ConfigError::ThresholdOutOfRange(-5)));
    }

    #[test]
    fn test_validate_reports_each_issue() {
        let config = AppConfig {
            ocr_threshold: 20,
            min_numbers_required: 0,
            capture_timeout_secs: 60,
            solve_interval_ms: 50,
            ..AppConfig::default()
        };

        let issues = config.validate();
        assert_eq!(issues.len(), 4);
        assert!(issues[0].contains("between 50 and 200"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = AppConfig::default();
        config.ocr_threshold = 140;
        config.division_mode = true;
        config.solver.ui_corner_size = 90;
        config.save(&path).unwrap();

        let loaded = load_config(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_merges_missing_keys_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "ocr_threshold": 120, "solver": { "min_math_ratio": 0.5 } }"#)
            .unwrap();

        let loaded = load_config(&path);
        assert_eq!(loaded.ocr_threshold, 120);
        assert_eq!(loaded.solve_interval_ms, 1000);
        assert_eq!(loaded.solver.min_math_ratio, 0.5);
        assert_eq!(loaded.solver.lone_digit_min_confidence, 70);
    }

    #[test]
    fn test_load_invalid_json_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert_eq!(load_config(&path), AppConfig::default());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        assert_eq!(load_config(&dir.path().join("missing.json")), AppConfig::default());
    }
}
