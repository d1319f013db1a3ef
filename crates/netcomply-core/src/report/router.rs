//! Dispatch of compliance errors to their reporters

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use super::ReporterRegistry;
use crate::error::CoreError;
use crate::taxonomy::ComplianceError;

/// Delivery outcome for one dispatched error
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchSummary {
    pub delivered: usize,
    pub failed: usize,
}

/// Hands each error to every reporter registered for its kind
#[derive(Debug, Clone)]
pub struct ReportRouter {
    registry: Arc<ReporterRegistry>,
}

impl ReportRouter {
    pub fn new(registry: Arc<ReporterRegistry>) -> Self {
        Self { registry }
    }

    /// Deliver `error` to its reporters in registration order
    ///
    /// A reporter that fails is logged and counted; the remaining reporters
    /// still receive the error.
    ///
    /// # Errors
    /// Returns `UnregisteredErrorKind` if nothing is registered for the kind.
    pub async fn dispatch(&self, error: ComplianceError) -> Result<DispatchSummary, CoreError> {
        let reporters = self.registry.reporters(error.kind);

        if reporters.is_empty() {
            return Err(CoreError::UnregisteredErrorKind {
                kind: error.kind,
                device: error.device,
            });
        }

        let mut summary = DispatchSummary::default();

        for reporter in reporters {
            match reporter.report(&error).await {
                Ok(()) => {
                    debug!(reporter = reporter.name(), kind = %error.kind, "reported");
                    summary.delivered += 1;
                }
                Err(e) => {
                    warn!(
                        reporter = reporter.name(),
                        kind = %error.kind,
                        device = %error.device,
                        error = %e,
                        "reporter failed"
                    );
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{ReportError, Reporter};
    use crate::taxonomy::ErrorKind;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording {
        seen: Mutex<Vec<String>>,
        fail: bool,
        label: &'static str,
        log: Option<Arc<Mutex<Vec<&'static str>>>>,
    }

    #[async_trait]
    impl Reporter for Recording {
        fn name(&self) -> &str {
            self.label
        }

        async fn report(&self, error: &ComplianceError) -> Result<(), ReportError> {
            self.seen.lock().unwrap().push(error.device.clone());
            if let Some(log) = &self.log {
                log.lock().unwrap().push(self.label);
            }
            if self.fail {
                return Err(ReportError::Rejected {
                    status: 500,
                    message: "down".to_string(),
                });
            }
            Ok(())
        }
    }

    fn mismatch() -> ComplianceError {
        ComplianceError::new(ErrorKind::HostnameMismatch, "sw01", "sw01 - hostnames do not match")
    }

    #[tokio::test]
    async fn test_unregistered_kind_is_fatal() {
        let router = ReportRouter::new(Arc::new(ReporterRegistry::new()));
        let err = router.dispatch(mismatch()).await.unwrap_err();

        match err {
            CoreError::UnregisteredErrorKind { kind, device } => {
                assert_eq!(kind, ErrorKind::HostnameMismatch);
                assert_eq!(device, "sw01");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_order_and_failure_isolation() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let failing = Arc::new(Recording {
            fail: true,
            label: "webhook",
            log: Some(Arc::clone(&order)),
            ..Default::default()
        });
        let healthy = Arc::new(Recording {
            label: "log",
            log: Some(Arc::clone(&order)),
            ..Default::default()
        });

        let mut registry = ReporterRegistry::new();
        registry
            .register(ErrorKind::HostnameMismatch, failing.clone())
            .register(ErrorKind::HostnameMismatch, healthy.clone());

        let router = ReportRouter::new(Arc::new(registry));
        let summary = router.dispatch(mismatch()).await.unwrap();

        assert_eq!(summary, DispatchSummary { delivered: 1, failed: 1 });
        assert_eq!(*order.lock().unwrap(), ["webhook", "log"]);
        assert_eq!(*healthy.seen.lock().unwrap(), ["sw01"]);
    }
}
