//! Observation module - one source's claim about one attribute

use thiserror::Error;

/// A single claim about one attribute of one business, from one source
///
/// Observations are produced by external connectors (scrapers, enrichment
/// APIs, heuristic inference) and are immutable once constructed. The
/// constructor is the ingestion boundary: anything that gets past it
/// conforms to the fixed schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    source_id: String,
    attribute_name: String,
    value: String,
    timestamp: u64,
    source_reliability_weight: f64,
}

/// Reasons an observation fails schema validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ObservationError {
    /// Source identifier is empty
    #[error("observation has an empty source id")]
    EmptySource,
    /// Attribute name is empty
    #[error("observation has an empty attribute name")]
    EmptyAttribute,
    /// Value is empty after trimming
    #[error("observation for '{attribute}' has an empty value")]
    EmptyValue {
        /// Attribute the empty value was reported for
        attribute: String,
    },
    /// Reliability weight is negative, NaN or infinite
    #[error("source '{source_id}' has invalid reliability weight {weight}")]
    InvalidWeight {
        /// Source that carried the weight
        source_id: String,
        /// The offending weight
        weight: f64,
    },
}

impl Observation {
    /// Create a validated observation
    ///
    /// Source and attribute names are trimmed; the attribute name is
    /// lowercased so `Size` and `size` vote in the same election.
    ///
    /// # Examples
    ///
    /// ```
    /// use rolodex_domain::Observation;
    ///
    /// let obs = Observation::new("linkedin", "size", "small", 1_700_000_000, 0.9).unwrap();
    /// assert_eq!(obs.attribute_name(), "size");
    /// assert!(Observation::new("", "size", "small", 0, 0.9).is_err());
    /// ```
    pub fn new(
        source_id: impl Into<String>,
        attribute_name: impl Into<String>,
        value: impl Into<String>,
        timestamp: u64,
        source_reliability_weight: f64,
    ) -> Result<Self, ObservationError> {
        let source_id = source_id.into().trim().to_string();
        let attribute_name = attribute_name.into().trim().to_lowercase();
        let value = value.into().trim().to_string();

        if source_id.is_empty() {
            return Err(ObservationError::EmptySource);
        }
        if attribute_name.is_empty() {
            return Err(ObservationError::EmptyAttribute);
        }
        if value.is_empty() {
            return Err(ObservationError::EmptyValue {
                attribute: attribute_name,
            });
        }
        if !source_reliability_weight.is_finite() || source_reliability_weight < 0.0 {
            return Err(ObservationError::InvalidWeight {
                source_id,
                weight: source_reliability_weight,
            });
        }

        Ok(Self {
            source_id,
            attribute_name,
            value,
            timestamp,
            source_reliability_weight,
        })
    }

    /// Source that made the claim (e.g. "linkedin", "website_analysis")
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Attribute the claim is about (lowercase)
    pub fn attribute_name(&self) -> &str {
        &self.attribute_name
    }

    /// Claimed value, trimmed but otherwise as reported
    pub fn value(&self) -> &str {
        &self.value
    }

    /// When the source observed the value (Unix seconds)
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Reliability weight of the source
    pub fn source_reliability_weight(&self) -> f64 {
        self.source_reliability_weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observation_normalizes_names() {
        let obs = Observation::new(" linkedin ", " Size ", " small ", 10, 0.9).unwrap();
        assert_eq!(obs.source_id(), "linkedin");
        assert_eq!(obs.attribute_name(), "size");
        assert_eq!(obs.value(), "small");
        assert_eq!(obs.timestamp(), 10);
    }

    #[test]
    fn test_observation_rejects_empty_fields() {
        assert_eq!(
            Observation::new("", "size", "small", 0, 1.0),
            Err(ObservationError::EmptySource)
        );
        assert_eq!(
            Observation::new("src", "  ", "small", 0, 1.0),
            Err(ObservationError::EmptyAttribute)
        );
        assert!(matches!(
            Observation::new("src", "size", "   ", 0, 1.0),
            Err(ObservationError::EmptyValue { .. })
        ));
    }

    #[test]
    fn test_observation_rejects_bad_weights() {
        assert!(Observation::new("src", "size", "small", 0, -0.1).is_err());
        assert!(Observation::new("src", "size", "small", 0, f64::NAN).is_err());
        assert!(Observation::new("src", "size", "small", 0, f64::INFINITY).is_err());
        // Weights above 1.0 are legal: sources are weighted relative to each other
        assert!(Observation::new("src", "size", "small", 0, 10.0).is_ok());
    }

    #[test]
    fn test_error_display() {
        let err = Observation::new("src", "size", "small", 0, -1.0).unwrap_err();
        assert!(err.to_string().contains("src"));
        assert!(matches!(&err, ObservationError::InvalidWeight { source_id, .. } if source_id == "src"));

        let boxed: Box<dyn std::error::Error> = Box::new(ObservationError::EmptySource);
        assert_eq!(boxed.to_string(), "observation has an empty source id");
    }
}
