//! Rolodex Identity
//!
//! Turns raw identifying fields into a registry key and decides whether a
//! business is already known.
//!
//! The crate provides:
//! - Identity normalization (domain, name, phone, address)
//! - Deterministic fingerprints over normalized identities
//! - Duplicate matching: exact fingerprint lookup with a fuzzy fallback
//!
//! # Examples
//!
//! ```
//! use rolodex_domain::RawIdentity;
//! use rolodex_identity::{fingerprint, normalize};
//!
//! let a = normalize(&RawIdentity::named("Acme Plumbing Pty Ltd").with_website("https://www.acme.com.au/"));
//! let b = normalize(&RawIdentity::named("ACME PLUMBING").with_website("acme.com.au"));
//! assert_eq!(fingerprint(&a), fingerprint(&b));
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod fingerprint;
mod matcher;
mod normalizer;

pub use config::MatcherConfig;
pub use error::MatchError;
pub use fingerprint::fingerprint;
pub use matcher::{name_jaccard, similarity, DuplicateCheck, DuplicateMatcher, MatchKind};
pub use normalizer::{
    normalize, normalize_address, normalize_domain, normalize_name, normalize_phone,
};
