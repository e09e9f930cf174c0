//! On-disk representation of registry rows
//!
//! The domain types stay free of serde; these mirrors define the JSON
//! layout shared by the file backend and the SQLite attribute column.

use crate::StoreError;
use rolodex_domain::{
    AttributeKind, BusinessIdentity, Conflict, ConflictKind, EntityRecord, Fingerprint,
    ResolvedAttribute, ResolvedValue, Severity,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Whole registry file: fingerprint → entity
pub(crate) type PersistedRegistry = BTreeMap<String, PersistedEntity>;

/// One registry row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct PersistedEntity {
    pub name: String,
    pub website: String,
    pub phone: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_id: Option<String>,
    pub first_seen: u64,
    pub last_seen: u64,
    pub retention_expiry: u64,
    pub overall_confidence: f64,
    #[serde(default)]
    pub resolved_attributes: BTreeMap<String, PersistedAttribute>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct PersistedAttribute {
    pub kind: String,
    /// `null` for unknown, a string or a list of items otherwise
    pub value: Option<PersistedValue>,
    pub confidence: f64,
    #[serde(default)]
    pub vote_distribution: BTreeMap<String, f64>,
    #[serde(default)]
    pub observation_count: usize,
    #[serde(default)]
    pub conflicts: Vec<PersistedConflict>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum PersistedValue {
    Value(String),
    Items(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct PersistedConflict {
    pub code: String,
    pub attributes: Vec<String>,
    pub severity: String,
    pub detail: PersistedConflictKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum PersistedConflictKind {
    CloseVote {
        winner: String,
        runner_up: String,
        ratio: f64,
    },
    RangeSpread {
        min_midpoint: f64,
        max_midpoint: f64,
        ratio: f64,
    },
    ExclusiveItems {
        category: String,
        first: String,
        second: String,
    },
    CrossField {
        rule: String,
    },
}

impl PersistedEntity {
    pub fn from_record(record: &EntityRecord) -> Self {
        Self {
            name: record.identity.normalized_name.clone(),
            website: record.identity.domain.clone(),
            phone: record.identity.phone_normalized.clone(),
            address: record.identity.address_normalized.clone(),
            registry_id: record.identity.registry_id.clone(),
            first_seen: record.first_seen,
            last_seen: record.last_seen,
            retention_expiry: record.retention_expiry,
            overall_confidence: record.overall_confidence,
            resolved_attributes: encode_attributes(&record.resolved_attributes),
        }
    }

    pub fn into_record(self, fingerprint: &str) -> Result<EntityRecord, StoreError> {
        let fingerprint = Fingerprint::from_hex(fingerprint).map_err(StoreError::InvalidData)?;
        Ok(EntityRecord {
            fingerprint,
            identity: BusinessIdentity {
                domain: self.website,
                normalized_name: self.name,
                phone_normalized: self.phone,
                address_normalized: self.address,
                registry_id: self.registry_id,
            },
            resolved_attributes: decode_attributes(self.resolved_attributes)?,
            overall_confidence: self.overall_confidence,
            first_seen: self.first_seen,
            last_seen: self.last_seen,
            retention_expiry: self.retention_expiry,
        })
    }
}

pub(crate) fn encode_attributes(
    attributes: &BTreeMap<String, ResolvedAttribute>,
) -> BTreeMap<String, PersistedAttribute> {
    attributes
        .iter()
        .map(|(name, attr)| (name.clone(), PersistedAttribute::from_domain(attr)))
        .collect()
}

pub(crate) fn decode_attributes(
    attributes: BTreeMap<String, PersistedAttribute>,
) -> Result<BTreeMap<String, ResolvedAttribute>, StoreError> {
    attributes
        .into_iter()
        .map(|(name, attr)| {
            let resolved = attr.into_domain(&name)?;
            Ok((name, resolved))
        })
        .collect()
}

impl PersistedAttribute {
    fn from_domain(attr: &ResolvedAttribute) -> Self {
        let value = match &attr.resolved_value {
            ResolvedValue::Unknown => None,
            ResolvedValue::Value(v) => Some(PersistedValue::Value(v.clone())),
            ResolvedValue::Items(items) => Some(PersistedValue::Items(items.clone())),
        };
        Self {
            kind: attr.kind.as_str().to_string(),
            value,
            confidence: attr.confidence,
            vote_distribution: attr.vote_distribution.clone(),
            observation_count: attr.observation_count,
            conflicts: attr.conflicts.iter().map(PersistedConflict::from_domain).collect(),
        }
    }

    fn into_domain(self, name: &str) -> Result<ResolvedAttribute, StoreError> {
        let kind = AttributeKind::parse(&self.kind).ok_or_else(|| {
            StoreError::InvalidData(format!("Unknown attribute kind '{}' for {}", self.kind, name))
        })?;
        let resolved_value = match self.value {
            None => ResolvedValue::Unknown,
            Some(PersistedValue::Value(v)) => ResolvedValue::Value(v),
            Some(PersistedValue::Items(items)) => ResolvedValue::Items(items),
        };
        let conflicts = self
            .conflicts
            .into_iter()
            .map(PersistedConflict::into_domain)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ResolvedAttribute {
            attribute_name: name.to_string(),
            kind,
            resolved_value,
            confidence: self.confidence,
            vote_distribution: self.vote_distribution,
            observation_count: self.observation_count,
            conflicts,
        })
    }
}

impl PersistedConflict {
    fn from_domain(conflict: &Conflict) -> Self {
        let detail = match &conflict.kind {
            ConflictKind::CloseVote { winner, runner_up, ratio } => PersistedConflictKind::CloseVote {
                winner: winner.clone(),
                runner_up: runner_up.clone(),
                ratio: *ratio,
            },
            ConflictKind::RangeSpread { min_midpoint, max_midpoint, ratio } => {
                PersistedConflictKind::RangeSpread {
                    min_midpoint: *min_midpoint,
                    max_midpoint: *max_midpoint,
                    ratio: *ratio,
                }
            }
            ConflictKind::ExclusiveItems { category, first, second } => {
                PersistedConflictKind::ExclusiveItems {
                    category: category.clone(),
                    first: first.clone(),
                    second: second.clone(),
                }
            }
            ConflictKind::CrossField { rule } => PersistedConflictKind::CrossField { rule: rule.clone() },
        };
        Self {
            code: conflict.code.clone(),
            attributes: conflict.attributes.clone(),
            severity: conflict.severity.as_str().to_string(),
            detail,
            message: conflict.message.clone(),
        }
    }

    fn into_domain(self) -> Result<Conflict, StoreError> {
        let severity = Severity::parse(&self.severity).ok_or_else(|| {
            StoreError::InvalidData(format!("Unknown severity '{}' on {}", self.severity, self.code))
        })?;
        let kind = match self.detail {
            PersistedConflictKind::CloseVote { winner, runner_up, ratio } => {
                ConflictKind::CloseVote { winner, runner_up, ratio }
            }
            PersistedConflictKind::RangeSpread { min_midpoint, max_midpoint, ratio } => {
                ConflictKind::RangeSpread { min_midpoint, max_midpoint, ratio }
            }
            PersistedConflictKind::ExclusiveItems { category, first, second } => {
                ConflictKind::ExclusiveItems { category, first, second }
            }
            PersistedConflictKind::CrossField { rule } => ConflictKind::CrossField { rule },
        };
        Ok(Conflict::new(self.code, self.attributes, severity, kind, self.message))
    }
}
