//! Gatekeeper error types

use rolodex_domain::Fingerprint;
use thiserror::Error;

/// Errors that can occur during gatekeeper operations
#[derive(Error, Debug)]
pub enum GatekeeperError {
    /// A rejected result was handed to commit
    #[error("Cannot commit rejected resolution for {0}")]
    NotAccepted(Fingerprint),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
