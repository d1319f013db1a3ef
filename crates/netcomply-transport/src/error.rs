//! Error types for netcomply-transport

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while querying a device
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Device did not answer in time
    #[error("query timed out after {timeout:?}")]
    Timeout {
        /// Timeout duration that was exceeded
        timeout: Duration,
    },

    /// Device rejected the credentials
    #[error("authentication failed: {0}")]
    AuthFailure(String),

    /// Device has no object at the requested identifier
    #[error("no such object: {0}")]
    NoSuchObject(String),

    /// Identifier could not be encoded for the wire
    #[error("invalid query identifier: {0}")]
    InvalidIdentifier(String),

    /// Any other protocol-layer failure
    #[error("query failed: {0}")]
    Other(String),
}

