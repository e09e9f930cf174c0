//! Per-fingerprint serialization of check-then-write sequences

use crate::EngineError;
use rolodex_domain::Fingerprint;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Table of mutexes keyed by fingerprint
///
/// Two submissions that normalize to the same fingerprint run their
/// duplicate check and upsert one after the other; different
/// fingerprints never wait on each other.
#[derive(Debug, Default)]
pub(crate) struct FingerprintLocks {
    slots: Mutex<HashMap<Fingerprint, Arc<Mutex<()>>>>,
}

impl FingerprintLocks {
    /// The mutex for `fingerprint`, created on first use
    ///
    /// Slots nobody else holds are dropped on the way in, so the table
    /// only ever contains fingerprints currently being worked on.
    pub fn slot(&self, fingerprint: &Fingerprint) -> Result<Arc<Mutex<()>>, EngineError> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| EngineError::LockPoisoned("fingerprint lock table".to_string()))?;
        slots.retain(|_, slot| Arc::strong_count(slot) > 1);
        Ok(Arc::clone(slots.entry(fingerprint.clone()).or_default()))
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.slots.lock().map(|s| s.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(hex: &str) -> Fingerprint {
        Fingerprint::from_hex(hex).unwrap()
    }

    #[test]
    fn test_same_fingerprint_same_slot() {
        let locks = FingerprintLocks::default();
        let a = locks.slot(&fp("aa")).unwrap();
        let b = locks.slot(&fp("aa")).unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        let c = locks.slot(&fp("bb")).unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[test]
    fn test_released_slots_are_pruned() {
        let locks = FingerprintLocks::default();
        drop(locks.slot(&fp("aa")).unwrap());
        let _held = locks.slot(&fp("bb")).unwrap();
        assert_eq!(locks.len(), 1);
    }

    #[test]
    fn test_slot_excludes_concurrent_holder() {
        let locks = FingerprintLocks::default();
        let slot = locks.slot(&fp("aa")).unwrap();
        let _guard = slot.lock().unwrap();

        let again = locks.slot(&fp("aa")).unwrap();
        assert!(again.try_lock().is_err());
    }
}
