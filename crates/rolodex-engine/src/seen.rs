//! Short-lived memory of rejected inputs
//!
//! A rejection never touches the registry, so without this an upstream
//! connector replaying the same batch would be fully re-resolved every
//! time. The marker key covers the fingerprint and every observation, so
//! any new evidence gets a fresh evaluation.

use crate::EngineError;
use rolodex_domain::{hex_digest, Fingerprint, Observation};
use rolodex_gatekeeper::ValidationResult;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Mutex;

const FIELD_SEP: u8 = 0x1f;
const RECORD_SEP: u8 = 0x1e;

/// Digest of a fingerprint plus its observations, order-insensitive
pub(crate) fn marker_key(fingerprint: &Fingerprint, observations: &[Observation]) -> String {
    let mut tuples: Vec<(&str, &str, &str, u64, u64)> = observations
        .iter()
        .map(|obs| {
            (
                obs.source_id(),
                obs.attribute_name(),
                obs.value(),
                obs.timestamp(),
                obs.source_reliability_weight().to_bits(),
            )
        })
        .collect();
    tuples.sort_unstable();

    let mut hasher = Sha256::new();
    hasher.update(fingerprint.as_str().as_bytes());
    for (source, attribute, value, timestamp, weight) in tuples {
        hasher.update([RECORD_SEP]);
        for field in [source, attribute, value] {
            hasher.update(field.as_bytes());
            hasher.update([FIELD_SEP]);
        }
        hasher.update(timestamp.to_be_bytes());
        hasher.update(weight.to_be_bytes());
    }
    hex_digest(&hasher.finalize())
}

#[derive(Debug)]
struct Marker {
    expires_at: u64,
    verdict: ValidationResult,
}

/// Rejected verdicts keyed by input digest, each with an expiry
#[derive(Debug)]
pub(crate) struct SeenMarkers {
    ttl_secs: u64,
    markers: Mutex<HashMap<String, Marker>>,
}

impl SeenMarkers {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            ttl_secs,
            markers: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Marker>>, EngineError> {
        self.markers
            .lock()
            .map_err(|_| EngineError::LockPoisoned("seen markers".to_string()))
    }

    /// The earlier verdict for `key`, if its marker is still live at `now`
    pub fn recall(&self, key: &str, now: u64) -> Result<Option<ValidationResult>, EngineError> {
        let mut markers = self.lock()?;
        markers.retain(|_, marker| marker.expires_at > now);
        Ok(markers.get(key).map(|marker| marker.verdict.clone()))
    }

    /// Remember a rejection until `now + ttl`
    pub fn remember(&self, key: String, verdict: ValidationResult, now: u64) -> Result<(), EngineError> {
        if self.ttl_secs == 0 {
            return Ok(());
        }
        let marker = Marker {
            expires_at: now.saturating_add(self.ttl_secs),
            verdict,
        };
        self.lock()?.insert(key, marker);
        Ok(())
    }
}
