//! Configuration for attribute resolution

use rolodex_domain::weighting::{DEFAULT_DECAY_FLOOR, DEFAULT_DECAY_HORIZON_MONTHS};
use rolodex_domain::DecayParams;
use serde::{Deserialize, Serialize};

/// Temporal decay curve, as loaded from configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecayConfig {
    /// Months until an observation has decayed to the floor
    pub horizon_months: f64,

    /// Lowest decay factor
    pub floor: f64,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            horizon_months: DEFAULT_DECAY_HORIZON_MONTHS,
            floor: DEFAULT_DECAY_FLOOR,
        }
    }
}

impl DecayConfig {
    /// Decay parameters for the weighting functions
    pub fn params(&self) -> DecayParams {
        DecayParams {
            horizon_months: self.horizon_months,
            floor: self.floor,
        }
    }
}

/// Voting thresholds
///
/// `conflict_ratio` is an empirical constant. It is kept configurable
/// until it has been calibrated against labeled data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Runner-up / winner weight ratio at which a categorical vote is a close call
    pub conflict_ratio: f64,

    /// Max / min midpoint ratio above which range estimates disagree
    pub spread_ratio: f64,

    /// Absolute weight a set item must exceed to be kept
    pub item_floor: f64,

    /// Temporal decay curve
    pub decay: DecayConfig,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            conflict_ratio: 0.7,
            spread_ratio: 5.0,
            item_floor: 0.5,
            decay: DecayConfig::default(),
        }
    }
}

impl ResolverConfig {
    /// Strict preset: flags disagreement earlier and demands more support per item
    pub fn strict() -> Self {
        Self {
            conflict_ratio: 0.5,
            spread_ratio: 3.0,
            item_floor: 0.8,
            decay: DecayConfig {
                horizon_months: 6.0,
                floor: 0.1,
            },
        }
    }

    /// Lenient preset: tolerates more disagreement and older data
    pub fn lenient() -> Self {
        Self {
            conflict_ratio: 0.9,
            spread_ratio: 10.0,
            item_floor: 0.3,
            decay: DecayConfig {
                horizon_months: 24.0,
                floor: 0.2,
            },
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.conflict_ratio.is_nan() || self.conflict_ratio <= 0.0 || self.conflict_ratio > 1.0 {
            return Err(format!(
                "conflict_ratio must be within (0, 1], got {}",
                self.conflict_ratio
            ));
        }
        if self.spread_ratio.is_nan() || self.spread_ratio < 1.0 {
            return Err(format!("spread_ratio must be at least 1, got {}", self.spread_ratio));
        }
        if !self.item_floor.is_finite() || self.item_floor < 0.0 {
            return Err(format!("item_floor must be non-negative, got {}", self.item_floor));
        }
        if self.decay.horizon_months.is_nan() || self.decay.horizon_months <= 0.0 {
            return Err("decay.horizon_months must be greater than 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.decay.floor) {
            return Err(format!("decay.floor must be within [0, 1], got {}", self.decay.floor));
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ResolverConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.conflict_ratio, 0.7);
        assert_eq!(config.decay.params(), DecayParams::default());
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(ResolverConfig::strict().validate().is_ok());
        assert!(ResolverConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_invalid_values() {
        let mut config = ResolverConfig::default();
        config.conflict_ratio = 0.0;
        assert!(config.validate().is_err());

        let mut config = ResolverConfig::default();
        config.spread_ratio = 0.5;
        assert!(config.validate().is_err());

        let mut config = ResolverConfig::default();
        config.decay.horizon_months = 0.0;
        assert!(config.validate().is_err());

        let mut config = ResolverConfig::default();
        config.decay.floor = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_nested_decay_table() {
        let config = ResolverConfig::from_toml(
            r#"
            conflict_ratio = 0.8

            [decay]
            horizon_months = 18.0
            "#,
        )
        .unwrap();
        assert_eq!(config.conflict_ratio, 0.8);
        assert_eq!(config.decay.horizon_months, 18.0);
        assert_eq!(config.decay.floor, 0.1);
        assert_eq!(config.item_floor, 0.5);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ResolverConfig::strict();
        let parsed = ResolverConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(config, parsed);
    }
}
