//! Error kind to reporter routes

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::Reporter;
use crate::taxonomy::ErrorKind;

/// Routes from error kind to an ordered list of reporters
///
/// Filled at startup and shared read-only during a run.
#[derive(Default, Clone)]
pub struct ReporterRegistry {
    routes: HashMap<ErrorKind, Vec<Arc<dyn Reporter>>>,
}

impl ReporterRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry routing every per-device kind to `reporter`
    #[must_use]
    pub fn with_default_sink(reporter: Arc<dyn Reporter>) -> Self {
        let mut registry = Self::new();
        registry.register_all(reporter);
        registry
    }

    /// Append `reporter` to the route for `kind`
    pub fn register(&mut self, kind: ErrorKind, reporter: Arc<dyn Reporter>) -> &mut Self {
        self.routes.entry(kind).or_default().push(reporter);
        self
    }

    /// Append `reporter` to every per-device route
    pub fn register_all(&mut self, reporter: Arc<dyn Reporter>) -> &mut Self {
        for kind in ErrorKind::PER_DEVICE {
            self.register(kind, Arc::clone(&reporter));
        }
        self
    }

    /// Reporters for `kind` in registration order
    #[must_use]
    pub fn reporters(&self, kind: ErrorKind) -> &[Arc<dyn Reporter>] {
        self.routes.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether `kind` has at least one reporter
    #[must_use]
    pub fn is_registered(&self, kind: ErrorKind) -> bool {
        !self.reporters(kind).is_empty()
    }

    /// Per-device kinds that have no reporter
    #[must_use]
    pub fn unregistered_kinds(&self) -> Vec<ErrorKind> {
        ErrorKind::PER_DEVICE
            .into_iter()
            .filter(|kind| !self.is_registered(*kind))
            .collect()
    }
}

impl fmt::Debug for ReporterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut routes: Vec<(&ErrorKind, Vec<&str>)> = self
            .routes
            .iter()
            .map(|(kind, reporters)| (kind, reporters.iter().map(|r| r.name()).collect()))
            .collect();
        routes.sort_by_key(|(kind, _)| **kind);

        f.debug_map().entries(routes).finish()
    }
}
