//! Core error types for netcomply-core

use thiserror::Error;

use crate::taxonomy::{ComplianceError, ErrorKind};

/// Errors that abort a compliance run
#[derive(Error, Debug, Clone)]
pub enum CoreError {
    /// Inventory could not be read
    #[error("inventory access failed: {0}")]
    InventoryAccess(String),

    /// A compliance error was raised with no reporter to receive it
    #[error("no reporter registered for error kind {kind} (raised for {device})")]
    UnregisteredErrorKind {
        /// Kind that has no route
        kind: ErrorKind,
        /// Device the undeliverable error belonged to
        device: String,
    },

    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl CoreError {
    /// Taxonomy kind of this failure, if it has one
    #[must_use]
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            CoreError::InventoryAccess(_) => Some(ErrorKind::InventoryAccessFailure),
            CoreError::UnregisteredErrorKind { .. } => Some(ErrorKind::UnregisteredErrorKind),
            CoreError::ConfigError(_) => None,
        }
    }
}

/// Outcome of a failed compliance pass
///
/// Per-device failures are recoverable and get reported; fatal ones end the run.
#[derive(Error, Debug, Clone)]
pub enum PassError {
    #[error(transparent)]
    Compliance(#[from] ComplianceError),

    #[error(transparent)]
    Fatal(#[from] CoreError),
}
