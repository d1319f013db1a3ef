//! Error types for the inventory client

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while talking to the inventory source
#[derive(Error, Debug)]
pub enum InventoryError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid URL
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Request did not complete in time
    #[error("inventory request timed out after {0:?}")]
    Timeout(Duration),

    /// API returned an error status
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error body returned by the server
        message: String,
    },

    /// Response body did not have the expected shape
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Invalid client configuration
    #[error("invalid configuration: {0}")]
    ConfigError(String),
}

impl InventoryError {
    /// Whether the failure means the source could not be reached at all
    #[must_use]
    pub fn is_unreachable(&self) -> bool {
        match self {
            InventoryError::Timeout(_) => true,
            InventoryError::Http(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }

    /// Whether the server rejected the credential
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, InventoryError::Api { status: 401 | 403, .. })
    }
}

/// Result type for inventory operations
pub type Result<T> = std::result::Result<T, InventoryError>;
