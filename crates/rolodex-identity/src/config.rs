//! Configuration for duplicate matching

use serde::{Deserialize, Serialize};

/// Thresholds and dimension weights of the fuzzy duplicate fallback
///
/// The similarity threshold is a calibration parameter: 0.85 is the
/// starting point, not a measured optimum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Similarity a candidate must exceed to count as a duplicate
    pub similarity_threshold: f64,

    /// Weight of the exact domain comparison
    pub domain_weight: f64,

    /// Weight of the name token-Jaccard comparison
    pub name_weight: f64,

    /// Weight of the exact phone comparison
    pub phone_weight: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.85,
            domain_weight: 1.0,
            name_weight: 0.4,
            phone_weight: 1.0,
        }
    }
}

impl MatcherConfig {
    /// Strict preset: only near-certain fuzzy matches are collapsed
    pub fn strict() -> Self {
        Self {
            similarity_threshold: 0.95,
            ..Self::default()
        }
    }

    /// Lenient preset: merges more aggressively, accepting false positives
    pub fn lenient() -> Self {
        Self {
            similarity_threshold: 0.7,
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(format!(
                "similarity_threshold must be within [0, 1], got {}",
                self.similarity_threshold
            ));
        }
        for (name, weight) in [
            ("domain_weight", self.domain_weight),
            ("name_weight", self.name_weight),
            ("phone_weight", self.phone_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(format!("{} must be a non-negative number, got {}", name, weight));
            }
        }
        if self.domain_weight + self.name_weight + self.phone_weight <= 0.0 {
            return Err("at least one dimension weight must be positive".to_string());
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
