//! Configuration for Janitor operations
//!
//! Defines the sweep interval and dry-run mode.

use crate::JanitorError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for the Janitor service
///
/// # Examples
///
/// ```
/// use rolodex_janitor::JanitorConfig;
///
/// // Default configuration (hourly)
/// let config = JanitorConfig::default();
/// assert_eq!(config.sweep_interval_minutes, 60);
///
/// // Aggressive cleanup
/// let config = JanitorConfig::aggressive();
/// assert_eq!(config.sweep_interval_minutes, 15);
///
/// // Lenient cleanup
/// let config = JanitorConfig::lenient();
/// assert_eq!(config.sweep_interval_minutes, 240);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JanitorConfig {
    /// How often to run the sweep cycle (in minutes)
    /// Default: Every 60 minutes (hourly)
    pub sweep_interval_minutes: u64,

    /// Dry-run mode: Log what would be evicted without actually evicting
    /// Default: false
    pub dry_run: bool,
}

impl Default for JanitorConfig {
    fn default() -> Self {
        Self {
            sweep_interval_minutes: 60,
            dry_run: false,
        }
    }
}

impl JanitorConfig {
    /// Aggressive configuration (sweeps every 15 minutes)
    ///
    /// Keeps the registry file small when many entities expire each day.
    pub fn aggressive() -> Self {
        Self {
            sweep_interval_minutes: 15,
            dry_run: false,
        }
    }

    /// Lenient configuration (sweeps every 4 hours)
    pub fn lenient() -> Self {
        Self {
            sweep_interval_minutes: 240,
            dry_run: false,
        }
    }

    /// Get sweep interval as Duration
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_minutes.saturating_mul(60))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.sweep_interval_minutes == 0 {
            return Err("sweep_interval_minutes must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }

    /// Load and validate configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, JanitorError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| JanitorError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        let config = Self::from_toml(&content).map_err(JanitorError::Config)?;
        config.validate().map_err(JanitorError::Config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = JanitorConfig::default();
        assert_eq!(config.sweep_interval_minutes, 60);
        assert!(!config.dry_run);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets_ordering() {
        let default = JanitorConfig::default();
        assert!(JanitorConfig::aggressive().sweep_interval() < default.sweep_interval());
        assert!(JanitorConfig::lenient().sweep_interval() > default.sweep_interval());
    }

    #[test]
    fn test_duration_conversion() {
        let config = JanitorConfig::default();
        assert_eq!(config.sweep_interval(), Duration::from_secs(60 * 60));
    }

    #[test]
    fn test_zero_interval_invalid() {
        let config = JanitorConfig {
            sweep_interval_minutes: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = JanitorConfig::from_toml("dry_run = true").unwrap();
        assert!(config.dry_run);
        assert_eq!(config.sweep_interval_minutes, 60);

        let parsed = JanitorConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("janitor.toml");
        std::fs::write(&path, "sweep_interval_minutes = 5\n").unwrap();
        assert_eq!(JanitorConfig::from_file(&path).unwrap().sweep_interval_minutes, 5);

        std::fs::write(&path, "sweep_interval_minutes = 0\n").unwrap();
        assert!(matches!(JanitorConfig::from_file(&path), Err(JanitorError::Config(_))));
        assert!(JanitorConfig::from_file(dir.path().join("missing.toml")).is_err());
    }
}
