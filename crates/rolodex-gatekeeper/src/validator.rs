//! Confidence gate logic

use crate::{GateConfig, GatekeeperError};
use rolodex_domain::{
    BusinessIdentity, Conflict, EntityRecord, Fingerprint, IdentityField, ResolutionId,
    ResolvedAttribute,
};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Full outcome of one resolution pass
///
/// A rejected result carries the same breakdown as an accepted one so an
/// operator can decide on a manual override.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    /// Identifier of the resolution pass
    pub resolution_id: ResolutionId,

    /// Registry key of the entity
    pub fingerprint: Fingerprint,

    /// Whether the entity passed the gate
    pub is_valid: bool,

    /// Accepted or rejected
    pub status: ValidationStatus,

    /// Rejection reasons (empty when accepted)
    pub reasons: Vec<RejectionReason>,

    /// Overall confidence after the conflict penalty
    pub confidence_score: f64,

    /// Mean of the per-attribute confidences
    pub mean_attribute_confidence: f64,

    /// Deduction applied for conflicts
    pub conflict_penalty: f64,

    /// Attribute-level and cross-field conflicts
    pub conflicts_detected: Vec<Conflict>,

    /// Resolved attributes keyed by name
    pub resolved_data: BTreeMap<String, ResolvedAttribute>,

    /// Identity fields that were empty after normalization
    pub missing_identity_fields: Vec<IdentityField>,
}

impl ValidationResult {
    /// Conflicts that block acceptance
    pub fn critical_conflicts(&self) -> impl Iterator<Item = &Conflict> {
        self.conflicts_detected.iter().filter(|c| c.is_critical())
    }
}

/// Validation status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStatus {
    /// Entity accepted into the registry
    Accepted,

    /// Entity rejected; the registry is untouched
    Rejected,
}

/// Reasons for rejection
#[derive(Debug, Clone, PartialEq)]
pub enum RejectionReason {
    /// Overall confidence below the configured minimum
    BelowConfidenceThreshold {
        /// Minimum confidence required
        required: f64,
        /// Actual overall confidence
        actual: f64,
    },

    /// At least one critical conflict was detected
    CriticalConflicts {
        /// Codes of the critical conflicts
        codes: Vec<String>,
    },
}

/// A record ready for upsert
#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    /// The record to write
    pub record: EntityRecord,

    /// False when a stored, more confident resolution was kept and only its
    /// retention window moved
    pub superseded: bool,
}

/// The Gatekeeper decides which resolutions enter the registry
#[derive(Debug, Clone, Default)]
pub struct Gatekeeper {
    config: GateConfig,
}

impl Gatekeeper {
    /// Create a new Gatekeeper with the given configuration
    pub fn new(config: GateConfig) -> Self {
        Self { config }
    }

    /// Create a Gatekeeper with default configuration
    pub fn default_config() -> Self {
        Self::new(GateConfig::default())
    }

    /// Gate configuration
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Overall confidence: `mean − min(max_penalty, per_conflict × count)`, floored at 0
    ///
    /// Returns `(overall, mean, penalty)`. An empty attribute map has a mean of 0.
    pub fn overall_confidence(
        &self,
        resolved: &BTreeMap<String, ResolvedAttribute>,
        conflict_count: usize,
    ) -> (f64, f64, f64) {
        let mean = if resolved.is_empty() {
            0.0
        } else {
            resolved.values().map(|a| a.confidence).sum::<f64>() / resolved.len() as f64
        };
        let penalty = (self.config.per_conflict_penalty * conflict_count as f64)
            .min(self.config.max_conflict_penalty);
        ((mean - penalty).max(0.0), mean, penalty)
    }

    /// Evaluate a resolution pass
    ///
    /// # Arguments
    ///
    /// * `fingerprint` - Registry key of the entity
    /// * `identity` - Normalized identity, checked for missing fields
    /// * `resolved` - Resolved attributes (their own conflicts are collected)
    /// * `cross_field` - Conflicts from the sanity checker
    ///
    /// # Returns
    ///
    /// An accepted result iff the overall confidence reaches the minimum and
    /// no conflict is critical
    pub fn evaluate(
        &self,
        fingerprint: Fingerprint,
        identity: &BusinessIdentity,
        resolved: BTreeMap<String, ResolvedAttribute>,
        cross_field: Vec<Conflict>,
    ) -> ValidationResult {
        let resolution_id = ResolutionId::new();

        let mut conflicts: Vec<Conflict> = resolved
            .values()
            .flat_map(|attr| attr.conflicts.iter().cloned())
            .collect();
        conflicts.extend(cross_field);

        let (confidence_score, mean, penalty) = self.overall_confidence(&resolved, conflicts.len());

        let mut reasons = Vec::new();

        // 1. Confidence threshold
        if confidence_score < self.config.min_confidence {
            reasons.push(RejectionReason::BelowConfidenceThreshold {
                required: self.config.min_confidence,
                actual: confidence_score,
            });
        }

        // 2. Critical conflicts
        let critical: Vec<String> = conflicts
            .iter()
            .filter(|c| c.is_critical())
            .map(|c| c.code.clone())
            .collect();
        if !critical.is_empty() {
            reasons.push(RejectionReason::CriticalConflicts { codes: critical });
        }

        let status = if reasons.is_empty() {
            ValidationStatus::Accepted
        } else {
            ValidationStatus::Rejected
        };

        let missing_identity_fields = identity.missing_fields();

        debug!(
            resolution = %resolution_id,
            fingerprint = %fingerprint.short(),
            mean,
            penalty,
            conflicts = conflicts.len(),
            "gate evaluated"
        );

        ValidationResult {
            resolution_id,
            fingerprint,
            is_valid: status == ValidationStatus::Accepted,
            status,
            reasons,
            confidence_score,
            mean_attribute_confidence: mean,
            conflict_penalty: penalty,
            conflicts_detected: conflicts,
            resolved_data: resolved,
            missing_identity_fields,
        }
    }

    /// Build the registry record for an accepted result
    ///
    /// `first_seen` of an existing record is preserved. The stored attributes
    /// are replaced only when the new confidence is at least the stored one;
    /// otherwise the stored resolution is kept and only `last_seen` and the
    /// retention window move.
    pub fn commit(
        &self,
        result: &ValidationResult,
        identity: &BusinessIdentity,
        existing: Option<&EntityRecord>,
        now: u64,
    ) -> Result<Commit, GatekeeperError> {
        if !result.is_valid {
            return Err(GatekeeperError::NotAccepted(result.fingerprint.clone()));
        }

        let commit = match existing {
            Some(stored) if stored.overall_confidence > result.confidence_score => {
                info!(
                    fingerprint = %result.fingerprint.short(),
                    stored = stored.overall_confidence,
                    candidate = result.confidence_score,
                    "stored resolution is more confident, keeping it"
                );
                let mut record = stored.clone();
                record.touch(now, self.config.retention_days);
                Commit {
                    record,
                    superseded: false,
                }
            }
            _ => {
                let mut record = EntityRecord {
                    fingerprint: result.fingerprint.clone(),
                    identity: identity.clone(),
                    resolved_attributes: result.resolved_data.clone(),
                    overall_confidence: result.confidence_score,
                    first_seen: existing.map_or(now, |stored| stored.first_seen),
                    last_seen: existing.map_or(now, |stored| stored.last_seen),
                    retention_expiry: now,
                };
                record.touch(now, self.config.retention_days);
                Commit {
                    record,
                    superseded: true,
                }
            }
        };
        Ok(commit)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use rolodex_domain::{AttributeKind, ResolvedValue};

    proptest! {
        /// Property: with no critical conflicts, acceptance is exactly overall ≥ threshold
        #[test]
        fn test_gate_threshold(
            confidences in prop::collection::vec(0.0f64..=1.0, 1..6),
            conflict_count in 0usize..5,
        ) {
            let gatekeeper = Gatekeeper::default_config();
            let mut resolved = BTreeMap::new();
            for (i, confidence) in confidences.iter().enumerate() {
                let name = format!("attr{}", i);
                let mut attr = ResolvedAttribute::unknown(name.clone(), AttributeKind::Categorical);
                attr.resolved_value = ResolvedValue::Value("x".to_string());
                attr.confidence = *confidence;
                resolved.insert(name, attr);
            }
            let warnings: Vec<Conflict> = (0..conflict_count)
                .map(|i| Conflict::new(
                    format!("w{}", i),
                    vec![],
                    rolodex_domain::Severity::Warning,
                    rolodex_domain::ConflictKind::CrossField { rule: format!("w{}", i) },
                    "warning",
                ))
                .collect();

            let result = gatekeeper.evaluate(
                Fingerprint::from_hex("ab").unwrap(),
                &BusinessIdentity::default(),
                resolved,
                warnings,
            );
            prop_assert_eq!(result.is_valid, result.confidence_score >= 0.6);
            prop_assert!(result.confidence_score <= result.mean_attribute_confidence);
            prop_assert!(result.confidence_score >= 0.0);
        }
    }
}
