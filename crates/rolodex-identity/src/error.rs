//! Identity error types

use thiserror::Error;

/// Errors that can occur during duplicate matching
#[derive(Error, Debug)]
pub enum MatchError {
    /// Store error while reading the registry
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
