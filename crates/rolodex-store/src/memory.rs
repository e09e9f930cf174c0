//! In-process registry with no persistence

use crate::StoreError;
use rolodex_domain::{EntityRecord, Fingerprint, RegistryStore, UpsertOutcome};
use std::collections::BTreeMap;

/// Registry held entirely in memory
///
/// Useful for tests and for one-shot reconciliation runs whose results
/// are exported elsewhere.
#[derive(Debug, Default, Clone)]
pub struct MemoryRegistry {
    records: BTreeMap<Fingerprint, EntityRecord>,
}

impl MemoryRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }
}

/// Shared upsert rule: the first acceptance date of a row never moves
pub(crate) fn merge_upsert(
    records: &mut BTreeMap<Fingerprint, EntityRecord>,
    mut record: EntityRecord,
) -> UpsertOutcome {
    match records.get(&record.fingerprint) {
        Some(existing) => {
            record.first_seen = existing.first_seen;
            records.insert(record.fingerprint.clone(), record);
            UpsertOutcome::Updated
        }
        None => {
            records.insert(record.fingerprint.clone(), record);
            UpsertOutcome::Inserted
        }
    }
}

pub(crate) fn drain_expired(
    records: &mut BTreeMap<Fingerprint, EntityRecord>,
    now: u64,
) -> Vec<Fingerprint> {
    let expired: Vec<Fingerprint> = records
        .values()
        .filter(|r| r.is_expired(now))
        .map(|r| r.fingerprint.clone())
        .collect();
    for fingerprint in &expired {
        records.remove(fingerprint);
    }
    expired
}

impl RegistryStore for MemoryRegistry {
    type Error = StoreError;

    fn load(&mut self) -> Result<usize, Self::Error> {
        Ok(self.records.len())
    }

    fn lookup(&self, fingerprint: &Fingerprint) -> Result<Option<EntityRecord>, Self::Error> {
        Ok(self.records.get(fingerprint).cloned())
    }

    fn entries(&self) -> Result<Vec<EntityRecord>, Self::Error> {
        Ok(self.records.values().cloned().collect())
    }

    fn upsert(&mut self, record: EntityRecord) -> Result<UpsertOutcome, Self::Error> {
        Ok(merge_upsert(&mut self.records, record))
    }

    fn evict_expired(&mut self, now: u64) -> Result<Vec<Fingerprint>, Self::Error> {
        Ok(drain_expired(&mut self.records, now))
    }

    fn len(&self) -> Result<usize, Self::Error> {
        Ok(self.records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolodex_domain::BusinessIdentity;

    fn record(fp: &str, first_seen: u64, expiry: u64) -> EntityRecord {
        EntityRecord {
            fingerprint: Fingerprint::from_hex(fp).unwrap(),
            identity: BusinessIdentity {
                normalized_name: "acme".to_string(),
                ..Default::default()
            },
            resolved_attributes: BTreeMap::new(),
            overall_confidence: 0.8,
            first_seen,
            last_seen: first_seen,
            retention_expiry: expiry,
        }
    }

    #[test]
    fn test_upsert_keeps_first_seen() {
        let mut registry = MemoryRegistry::new();
        assert_eq!(registry.upsert(record("aa", 100, 1000)).unwrap(), UpsertOutcome::Inserted);
        assert_eq!(registry.upsert(record("aa", 500, 2000)).unwrap(), UpsertOutcome::Updated);

        let stored = registry.lookup(&Fingerprint::from_hex("aa").unwrap()).unwrap().unwrap();
        assert_eq!(stored.first_seen, 100);
        assert_eq!(stored.last_seen, 500);
        assert_eq!(stored.retention_expiry, 2000);
        assert_eq!(registry.len().unwrap(), 1);
    }

    #[test]
    fn test_evict_expired_boundary() {
        let mut registry = MemoryRegistry::new();
        registry.upsert(record("aa", 0, 100)).unwrap();
        registry.upsert(record("bb", 0, 101)).unwrap();

        // Expiry is inclusive of the boundary second
        let evicted = registry.evict_expired(100).unwrap();
        assert_eq!(evicted, vec![Fingerprint::from_hex("aa").unwrap()]);
        assert_eq!(registry.len().unwrap(), 1);
        assert!(registry.evict_expired(100).unwrap().is_empty());
    }

    #[test]
    fn test_entries_ordered_by_fingerprint() {
        let mut registry = MemoryRegistry::new();
        registry.upsert(record("cc", 0, 10)).unwrap();
        registry.upsert(record("aa", 0, 10)).unwrap();
        let order: Vec<String> = registry
            .entries()
            .unwrap()
            .into_iter()
            .map(|r| r.fingerprint.as_str().to_string())
            .collect();
        assert_eq!(order, vec!["aa", "cc"]);
        assert!(!registry.is_empty().unwrap());
    }
}
