//! Rolodex Storage Layer
//!
//! Backends for the [`RegistryStore`](rolodex_domain::RegistryStore) trait.
//!
//! # Backends
//!
//! - [`MemoryRegistry`]: in-process map, nothing persisted
//! - [`JsonFileRegistry`]: one JSON document rewritten atomically on every mutation
//! - [`SqliteRegistry`]: one row per fingerprint in a SQLite table
//!
//! Every backend keeps the `first_seen` of an existing row on upsert and
//! treats a record as expired once `now >= retention_expiry`.
//!
//! # Examples
//!
//! ```no_run
//! use rolodex_domain::RegistryStore;
//! use rolodex_store::JsonFileRegistry;
//!
//! let mut registry = JsonFileRegistry::open("registry.json").unwrap();
//! let evicted = registry.evict_expired(1_700_000_000).unwrap();
//! println!("evicted {} entries", evicted.len());
//! ```

#![warn(missing_docs)]

mod error;
mod json_file;
mod memory;
mod persisted;
mod sqlite;

pub use error::StoreError;
pub use json_file::JsonFileRegistry;
pub use memory::MemoryRegistry;
pub use sqlite::SqliteRegistry;
