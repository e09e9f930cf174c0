//! Ingestion boundary: raw connector records to validated observations

use crate::EngineError;
use rolodex_domain::{Observation, ObservationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// An observation as handed over by an external connector
///
/// Connectors do not know how much to trust themselves; reliability is
/// assigned here from [`SourceWeights`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    /// Connector that produced the record
    pub source: String,

    /// Attribute the record is about
    pub attribute_name: String,

    /// Reported value
    pub value: String,

    /// When the source observed the value (Unix seconds)
    pub timestamp: u64,
}

impl RawObservation {
    /// Create a raw observation
    pub fn new(
        source: impl Into<String>,
        attribute_name: impl Into<String>,
        value: impl Into<String>,
        timestamp: u64,
    ) -> Self {
        Self {
            source: source.into(),
            attribute_name: attribute_name.into(),
            value: value.into(),
            timestamp,
        }
    }

    /// Parse a JSON array of raw observations
    pub fn parse_batch(json: &str) -> Result<Vec<Self>, EngineError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Per-source reliability table
///
/// ```toml
/// [sources]
/// default_weight = 0.5
///
/// [sources.weights]
/// linkedin = 0.9
/// website_analysis = 0.7
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceWeights {
    /// Weight for sources missing from the table
    pub default_weight: f64,

    /// Known sources and their reliability
    pub weights: BTreeMap<String, f64>,
}

impl Default for SourceWeights {
    fn default() -> Self {
        Self {
            default_weight: 0.5,
            weights: BTreeMap::new(),
        }
    }
}

impl SourceWeights {
    /// Add or replace a source weight
    pub fn with_source(mut self, source: impl Into<String>, weight: f64) -> Self {
        self.weights.insert(source.into(), weight);
        self
    }

    /// Reliability weight for a source
    pub fn weight_for(&self, source: &str) -> f64 {
        self.weights
            .get(source.trim())
            .copied()
            .unwrap_or(self.default_weight)
    }

    /// Validate the table
    pub fn validate(&self) -> Result<(), String> {
        let bad = |w: f64| !w.is_finite() || w < 0.0;
        if bad(self.default_weight) {
            return Err(format!(
                "default_weight must be a non-negative number, got {}",
                self.default_weight
            ));
        }
        if let Some((source, weight)) = self.weights.iter().find(|(_, w)| bad(**w)) {
            return Err(format!(
                "weight for source '{}' must be a non-negative number, got {}",
                source, weight
            ));
        }
        Ok(())
    }

    /// Validate raw records into observations
    ///
    /// Records failing the observation schema are set aside with their
    /// reason; they never abort the batch.
    pub fn ingest(&self, raw: impl IntoIterator<Item = RawObservation>) -> IngestReport {
        let mut report = IngestReport::default();
        for record in raw {
            let weight = self.weight_for(&record.source);
            match Observation::new(
                record.source.as_str(),
                record.attribute_name.as_str(),
                record.value.as_str(),
                record.timestamp,
                weight,
            ) {
                Ok(obs) => report.accepted.push(obs),
                Err(e) => {
                    warn!("Rejected observation from '{}': {}", record.source, e);
                    report.rejected.push((record, e));
                }
            }
        }
        report
    }
}

/// Outcome of ingesting a batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    /// Observations that passed validation
    pub accepted: Vec<Observation>,

    /// Records that failed, with the reason
    pub rejected: Vec<(RawObservation, ObservationError)>,
}

impl IngestReport {
    /// True when every record was accepted
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}
