//! Error types for the dynup system
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for dynup operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the dynup system
#[derive(Error, Debug)]
pub enum Error {
    /// IP resolution errors (network failure, bad status, unparseable body)
    #[error("IP resolution error: {0}")]
    IpResolve(String),

    // Update failures carry no variant here: the update client reports
    // them in-band via UpdateOutcome
    /// State store errors
    #[error("state store error: {0}")]
    StateStore(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an IP resolution error
    pub fn ip_resolve(msg: impl Into<String>) -> Self {
        Self::IpResolve(msg.into())
    }

    /// Create a state store error
    pub fn state_store(msg: impl Into<String>) -> Self {
        Self::StateStore(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
