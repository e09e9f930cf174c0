//! Rolodex Domain Layer
//!
//! This crate contains the data model for business-entity reconciliation.
//! Apart from `uuid` and `thiserror` it has no external dependencies and defines the
//! value objects and trait interfaces that all other crates depend upon.
//!
//! ## Key Concepts
//!
//! - **Observation**: One source's claim about one attribute of one business
//! - **BusinessIdentity**: Normalized identifying fields (domain, name, phone, address)
//! - **Fingerprint**: Deterministic hash of a normalized identity, the registry key
//! - **ResolvedAttribute**: The outcome of weighted voting over observations
//! - **Conflict**: A disagreement between sources or between resolved attributes
//! - **EntityRecord**: A committed, retention-bounded registry row
//!
//! ## Architecture
//!
//! - Pure data and pure functions only
//! - Infrastructure implementations (registry backends) live in other crates
//! - Trait definitions for all storage interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod attribute;
pub mod conflict;
pub mod identity;
pub mod observation;
pub mod record;
pub mod traits;
pub mod weighting;

// Re-exports for convenience
pub use attribute::{AttributeKind, ResolvedAttribute, ResolvedValue};
pub use conflict::{Conflict, ConflictKind, Severity};
pub use identity::{hex_digest, BusinessIdentity, Fingerprint, IdentityField, RawIdentity};
pub use observation::{Observation, ObservationError};
pub use record::{EntityRecord, ResolutionId};
pub use traits::{RegistryStore, UpsertOutcome};
pub use weighting::DecayParams;

/// Seconds in one day, the unit retention windows are expressed in
pub const SECONDS_PER_DAY: u64 = 86_400;
