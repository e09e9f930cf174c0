//! Rolodex Gatekeeper
//!
//! The confidence gate between resolution and the registry.
//!
//! The Gatekeeper provides:
//! - Overall confidence: mean attribute confidence minus a capped conflict penalty
//! - Accept/reject decisions (threshold plus "no critical conflicts")
//! - A full breakdown for rejected entities
//! - Construction of the registry record on acceptance
//!
//! # Examples
//!
//! ```
//! use rolodex_domain::{BusinessIdentity, Fingerprint};
//! use rolodex_gatekeeper::{GateConfig, Gatekeeper};
//! use std::collections::BTreeMap;
//!
//! let gatekeeper = Gatekeeper::new(GateConfig::default());
//! let result = gatekeeper.evaluate(
//!     Fingerprint::from_hex("abc123").unwrap(),
//!     &BusinessIdentity::default(),
//!     BTreeMap::new(),
//!     vec![],
//! );
//!
//! // Nothing resolved: nothing to be confident about
//! assert!(!result.is_valid);
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod validator;

pub use config::{GateConfig, MAX_RETENTION_DAYS};
pub use error::GatekeeperError;
pub use validator::{Commit, Gatekeeper, RejectionReason, ValidationResult, ValidationStatus};
