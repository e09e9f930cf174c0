//! Error types for the reconciliation engine

use rolodex_gatekeeper::GatekeeperError;
use rolodex_identity::MatchError;
use thiserror::Error;

/// Errors that can occur during reconciliation
///
/// Per-entity problems (conflicts, low confidence, duplicates) are not
/// errors; they come back inside a [`ReconcileOutcome`](crate::ReconcileOutcome).
#[derive(Error, Debug)]
pub enum EngineError {
    /// Registry read or write failed; the registry keeps its last-known-good state
    #[error("Registry error: {0}")]
    Registry(String),

    /// Duplicate matching failed
    #[error("Match error: {0}")]
    Match(#[from] MatchError),

    /// Commit refused by the gate
    #[error("Gate error: {0}")]
    Gate(#[from] GatekeeperError),

    /// A shared lock was poisoned by a panicking holder
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),

    /// Observation batch could not be parsed
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::JsonParse(e.to_string())
    }
}
