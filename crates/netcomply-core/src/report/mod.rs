//! Reporting sinks and routing

mod json_lines;
mod log;
mod registry;
mod router;
mod webhook;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::taxonomy::ComplianceError;

pub use json_lines::JsonLinesReporter;
pub use log::LogReporter;
pub use registry::ReporterRegistry;
pub use router::{DispatchSummary, ReportRouter};
pub use webhook::WebhookReporter;

/// Sink delivery failure
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Receiver answered with a non-success status
    #[error("receiver returned {status}: {message}")]
    Rejected { status: u16, message: String },
}

/// A registered handler that records classified errors externally
#[async_trait]
pub trait Reporter: Send + Sync {
    /// Short name used in logs and configuration
    fn name(&self) -> &str;

    /// Record one error
    ///
    /// # Errors
    /// Returns an error if the sink could not record it.
    async fn report(&self, error: &ComplianceError) -> Result<(), ReportError>;
}

/// Wire form of a reported error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub reported_at: DateTime<Utc>,
    #[serde(flatten)]
    pub error: ComplianceError,
}

impl ReportRecord {
    pub fn now(error: &ComplianceError) -> Self {
        Self {
            reported_at: Utc::now(),
            error: error.clone(),
        }
    }
}
