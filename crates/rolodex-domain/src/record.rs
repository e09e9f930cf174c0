//! Record module - committed registry rows and resolution pass identifiers

use crate::{BusinessIdentity, Fingerprint, ResolvedAttribute, SECONDS_PER_DAY};
use std::collections::BTreeMap;
use std::fmt;

/// Unique identifier for one resolution pass, based on UUIDv7
///
/// UUIDv7 keeps identifiers chronologically sortable so the log lines of
/// consecutive passes line up without a separate sequence counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResolutionId(u128);

impl ResolutionId {
    /// Generate a new UUIDv7-based ResolutionId
    ///
    /// # Examples
    ///
    /// ```
    /// use rolodex_domain::ResolutionId;
    ///
    /// let id = ResolutionId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a ResolutionId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a ResolutionId from a UUID string
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid UUIDv7 string: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for ResolutionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ResolutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// A reconciled business, as committed to the registry
///
/// Records are only ever written through upsert: one row per fingerprint.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    /// Registry key
    pub fingerprint: Fingerprint,

    /// Normalized identity the fingerprint was computed from
    pub identity: BusinessIdentity,

    /// Resolved attributes keyed by attribute name
    pub resolved_attributes: BTreeMap<String, ResolvedAttribute>,

    /// Gate confidence at commit time
    pub overall_confidence: f64,

    /// When the entity was first accepted (Unix seconds)
    pub first_seen: u64,

    /// When the entity was last accepted or refreshed (Unix seconds)
    pub last_seen: u64,

    /// When the entity leaves the registry (Unix seconds)
    pub retention_expiry: u64,
}

impl EntityRecord {
    /// Whether the retention window has closed at `now`
    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.retention_expiry
    }

    /// Move `last_seen` to `now` and restart the retention window
    pub fn touch(&mut self, now: u64, retention_days: u64) {
        self.last_seen = now.max(self.last_seen);
        self.retention_expiry = now.saturating_add(retention_days.saturating_mul(SECONDS_PER_DAY));
    }
}
