//! Rolodex Engine
//!
//! Reconciles what many sources say about a business into one registry entry.
//!
//! # Architecture
//!
//! ```text
//! RawObservation → ingest → Observation ┐
//! RawIdentity → normalize → fingerprint ┴→ duplicate check → resolve → sanity → gate → registry
//! ```
//!
//! # Key Features
//!
//! - **Ingestion Boundary**: Connector records are validated and weighted per source
//! - **Duplicate Short-Circuit**: Known businesses skip resolution entirely
//! - **Evict Before Lookup**: Expired entries never influence matching
//! - **Per-Fingerprint Locking**: Concurrent callers cannot both insert the same business
//! - **Seen Markers**: An input rejected moments ago is not resolved again
//!
//! # Example Usage
//!
//! ```
//! use rolodex_domain::RawIdentity;
//! use rolodex_engine::{EngineConfig, EntitySubmission, RawObservation, Reconciler, SourceWeights};
//! use rolodex_store::MemoryRegistry;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EngineConfig {
//!     sources: SourceWeights::default()
//!         .with_source("linkedin", 0.9)
//!         .with_source("website_analysis", 0.7),
//!     ..Default::default()
//! };
//! let reconciler = Reconciler::new(MemoryRegistry::new(), config)?;
//!
//! let now = 1_700_000_000;
//! let report = reconciler.ingest(vec![
//!     RawObservation::new("linkedin", "size", "small", now),
//!     RawObservation::new("website_analysis", "size", "small", now),
//! ]);
//!
//! let submission = EntitySubmission::new(
//!     RawIdentity::named("Acme Widgets LLC")
//!         .with_website("https://www.acme.com")
//!         .with_phone("+1 (555) 010-0000"),
//! )
//! .with_observations(report.accepted);
//!
//! let outcome = reconciler.reconcile_at(&submission, now)?;
//! assert!(outcome.is_accepted());
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod ingest;
mod locks;
mod reconciler;
mod seen;
mod types;

#[cfg(test)]
mod tests;

pub use config::EngineConfig;
pub use error::EngineError;
pub use ingest::{IngestReport, RawObservation, SourceWeights};
pub use reconciler::Reconciler;
pub use types::{EntitySubmission, ReconcileOutcome};
