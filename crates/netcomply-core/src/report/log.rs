//! Structured log sink

use async_trait::async_trait;
use tracing::warn;

use super::{ReportError, Reporter};
use crate::taxonomy::ComplianceError;

/// Writes each error as a structured `warn` event
///
/// This is the default sink: every per-device kind reaches it unless routes
/// say otherwise.
#[derive(Debug, Clone)]
pub struct LogReporter {
    name: String,
}

impl Default for LogReporter {
    fn default() -> Self {
        Self {
            name: "log".to_string(),
        }
    }
}

impl LogReporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[async_trait]
impl Reporter for LogReporter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn report(&self, error: &ComplianceError) -> Result<(), ReportError> {
        let ctx = &error.context;

        warn!(
            target: "netcomply::compliance",
            sink = %self.name,
            kind = %error.kind,
            device = %error.device,
            attribute = ctx.attribute.map(|a| a.as_str()),
            query_identifier = ctx.query_identifier.as_deref(),
            device_type = ctx.device_type.as_deref(),
            inventory_value = ctx.inventory_value.as_deref(),
            live_value = ctx.live_value.as_deref(),
            detail = ctx.detail.as_deref(),
            "{}",
            error.message
        );

        Ok(())
    }
}
