//! Configuration for the reconciliation engine
//!
//! One TOML document carries every stage's settings:
//!
//! ```toml
//! seen_marker_ttl_secs = 3600
//!
//! [matcher]
//! similarity_threshold = 0.85
//!
//! [resolver]
//! conflict_ratio = 0.7
//!
//! [gate]
//! min_confidence = 0.6
//!
//! [sources]
//! default_weight = 0.5
//!
//! [sources.weights]
//! linkedin = 0.9
//! ```

use crate::{EngineError, SourceWeights};
use rolodex_gatekeeper::GateConfig;
use rolodex_identity::MatcherConfig;
use rolodex_resolver::ResolverConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the Reconciler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How long a rejected input is remembered (seconds)
    pub seen_marker_ttl_secs: u64,

    /// Duplicate matching thresholds
    pub matcher: MatcherConfig,

    /// Voting and conflict thresholds
    pub resolver: ResolverConfig,

    /// Acceptance thresholds and retention window
    pub gate: GateConfig,

    /// Source reliability table used at ingestion
    pub sources: SourceWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seen_marker_ttl_secs: 3600,
            matcher: MatcherConfig::default(),
            resolver: ResolverConfig::default(),
            gate: GateConfig::default(),
            sources: SourceWeights::default(),
        }
    }
}

impl EngineConfig {
    /// Strict preset: every stage at its strict setting
    pub fn strict() -> Self {
        Self {
            matcher: MatcherConfig::strict(),
            resolver: ResolverConfig::strict(),
            gate: GateConfig::strict(),
            ..Default::default()
        }
    }

    /// Lenient preset: looser matching and voting, default gate
    pub fn lenient() -> Self {
        Self {
            matcher: MatcherConfig::lenient(),
            resolver: ResolverConfig::lenient(),
            ..Default::default()
        }
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), String> {
        self.matcher.validate().map_err(|e| format!("[matcher] {}", e))?;
        self.resolver.validate().map_err(|e| format!("[resolver] {}", e))?;
        self.gate.validate().map_err(|e| format!("[gate] {}", e))?;
        self.sources.validate().map_err(|e| format!("[sources] {}", e))?;
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
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        let config = Self::from_toml(&content).map_err(EngineError::Config)?;
        config.validate().map_err(EngineError::Config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.seen_marker_ttl_secs, 3600);
        assert_eq!(config.matcher.similarity_threshold, 0.85);
        assert_eq!(config.resolver.conflict_ratio, 0.7);
        assert_eq!(config.gate.min_confidence, 0.6);
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(EngineConfig::strict().validate().is_ok());
        assert!(EngineConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_partial_document() {
        let config = EngineConfig::from_toml(
            r#"
            seen_marker_ttl_secs = 60

            [gate]
            min_confidence = 0.5

            [sources.weights]
            linkedin = 0.9
            "#,
        )
        .unwrap();
        assert_eq!(config.seen_marker_ttl_secs, 60);
        assert_eq!(config.gate.min_confidence, 0.5);
        assert_eq!(config.gate.retention_days, 30);
        assert_eq!(config.sources.weight_for("linkedin"), 0.9);
        assert_eq!(config.matcher, MatcherConfig::default());
    }

    #[test]
    fn test_invalid_section_is_named() {
        let mut config = EngineConfig::default();
        config.gate.retention_days = 0;
        let err = config.validate().unwrap_err();
        assert!(err.starts_with("[gate]"));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = EngineConfig {
            sources: SourceWeights::default().with_source("linkedin", 0.9),
            ..EngineConfig::strict()
        };
        let parsed = EngineConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rolodex.toml");
        std::fs::write(&path, "[resolver]\nconflict_ratio = 0.8\n").unwrap();
        assert_eq!(EngineConfig::from_file(&path).unwrap().resolver.conflict_ratio, 0.8);

        std::fs::write(&path, "[matcher]\nsimilarity_threshold = 2.0\n").unwrap();
        assert!(matches!(EngineConfig::from_file(&path), Err(EngineError::Config(_))));
    }
}
