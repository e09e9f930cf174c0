//! Gatekeeper configuration

use rolodex_domain::SECONDS_PER_DAY;
use serde::{Deserialize, Serialize};

/// Upper bound on `retention_days` (one hundred years)
pub const MAX_RETENTION_DAYS: u64 = 36_500;

/// Acceptance thresholds and retention window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Minimum overall confidence for acceptance
    pub min_confidence: f64,

    /// Confidence deducted per detected conflict
    pub per_conflict_penalty: f64,

    /// Cap on the total conflict deduction
    pub max_conflict_penalty: f64,

    /// Days an accepted entity stays in the registry
    pub retention_days: u64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.6,
            per_conflict_penalty: 0.1,
            max_conflict_penalty: 0.3,
            retention_days: 30,
        }
    }
}

impl GateConfig {
    /// Create a permissive configuration (accepts almost anything without critical conflicts)
    pub fn permissive() -> Self {
        Self {
            min_confidence: 0.0,
            per_conflict_penalty: 0.0,
            max_conflict_penalty: 0.0,
            retention_days: 30,
        }
    }

    /// Create a strict configuration (higher bar, harsher conflict penalty)
    pub fn strict() -> Self {
        Self {
            min_confidence: 0.75,
            per_conflict_penalty: 0.15,
            max_conflict_penalty: 0.45,
            retention_days: 30,
        }
    }

    /// Retention window in seconds
    pub fn retention_secs(&self) -> u64 {
        self.retention_days.saturating_mul(SECONDS_PER_DAY)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(format!(
                "min_confidence must be within [0, 1], got {}",
                self.min_confidence
            ));
        }
        if !(0.0..=1.0).contains(&self.per_conflict_penalty) {
            return Err(format!(
                "per_conflict_penalty must be within [0, 1], got {}",
                self.per_conflict_penalty
            ));
        }
        if !(0.0..=1.0).contains(&self.max_conflict_penalty) {
            return Err(format!(
                "max_conflict_penalty must be within [0, 1], got {}",
                self.max_conflict_penalty
            ));
        }
        if self.retention_days == 0 {
            return Err("retention_days must be greater than 0".to_string());
        }
        if self.retention_days > MAX_RETENTION_DAYS {
            return Err(format!(
                "retention_days must be at most {}, got {}",
                MAX_RETENTION_DAYS, self.retention_days
            ));
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
}
