//! Trait definitions for external interactions
//!
//! These traits define the boundary between reconciliation logic and
//! storage. Backends live in `rolodex-store`.

use crate::{EntityRecord, Fingerprint};

/// What an upsert did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No row existed for the fingerprint
    Inserted,
    /// The existing row was replaced
    Updated,
}

/// Persistent `fingerprint → EntityRecord` store with upsert semantics
///
/// Implemented by the infrastructure layer (rolodex-store). Callers are
/// expected to run [`RegistryStore::evict_expired`] before any lookup so
/// stale rows never influence matching.
pub trait RegistryStore {
    /// Error type for store operations
    type Error;

    /// Load persisted state, returning the number of records now held
    fn load(&mut self) -> Result<usize, Self::Error>;

    /// Get the record for a fingerprint
    fn lookup(&self, fingerprint: &Fingerprint) -> Result<Option<EntityRecord>, Self::Error>;

    /// All records, ordered by fingerprint
    fn entries(&self) -> Result<Vec<EntityRecord>, Self::Error>;

    /// Insert or replace the record keyed by its fingerprint
    ///
    /// Implementations keep `first_seen` of an existing row.
    fn upsert(&mut self, record: EntityRecord) -> Result<UpsertOutcome, Self::Error>;

    /// Remove every record whose retention window has closed at `now`
    fn evict_expired(&mut self, now: u64) -> Result<Vec<Fingerprint>, Self::Error>;

    /// Number of records held
    fn len(&self) -> Result<usize, Self::Error>;

    /// True when the store holds no records
    fn is_empty(&self) -> Result<bool, Self::Error> {
        Ok(self.len()? == 0)
    }
}
