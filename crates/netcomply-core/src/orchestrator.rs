//! Fleet compliance pass

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use netcomply_inventory::{DeviceFilter, InventorySource, RawDevice};
use netcomply_transport::TelemetryTransport;
use serde::Serialize;
use tracing::{info, instrument};

use crate::collect::TelemetryCollector;
use crate::compare::Comparator;
use crate::config::FleetConfig;
use crate::error::{CoreError, PassError};
use crate::report::{ReportRouter, ReporterRegistry};
use crate::resolve::MappingResolver;
use crate::taxonomy::ErrorKind;
use crate::types::DeviceRecord;
use crate::validate::validate_device;

/// A device whose pass failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedDevice {
    pub device: String,
    pub kind: ErrorKind,
    pub message: String,
}

/// Outcome of a fleet pass
#[derive(Debug, Clone, Serialize)]
pub struct FleetReport {
    pub started_at: DateTime<Utc>,
    pub total: usize,
    /// Names of compliant devices, sorted
    pub compliant: Vec<String>,
    /// Failed devices, sorted by device
    pub failed: Vec<FailedDevice>,
    /// Reporter deliveries that failed
    pub undelivered_reports: usize,
    pub elapsed_ms: u64,
}

impl FleetReport {
    fn new(started_at: DateTime<Utc>, total: usize) -> Self {
        Self {
            started_at,
            total,
            compliant: Vec::new(),
            failed: Vec::new(),
            undelivered_reports: 0,
            elapsed_ms: 0,
        }
    }

    /// Whether every device passed
    #[must_use]
    pub fn is_fully_compliant(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of failed devices per kind
    #[must_use]
    pub fn failures_by_kind(&self) -> BTreeMap<ErrorKind, usize> {
        let mut counts = BTreeMap::new();
        for failed in &self.failed {
            *counts.entry(failed.kind).or_insert(0) += 1;
        }
        counts
    }
}

enum DeviceOutcome {
    Compliant(String),
    Failed {
        failure: FailedDevice,
        undelivered: usize,
    },
}

/// Runs validate, resolve, collect and compare for every device
///
/// Devices are processed concurrently up to the configured limit; the
/// stages for one device always run in order. A per-device failure is routed
/// to its reporters and the pass moves on; a fatal error stops the run and
/// drops any in-flight device work.
pub struct FleetOrchestrator {
    inventory: Arc<dyn InventorySource>,
    resolver: MappingResolver,
    collector: TelemetryCollector,
    comparator: Comparator,
    router: ReportRouter,
    transport_type: &'static str,
    concurrency: usize,
}

impl FleetOrchestrator {
    /// Wire an orchestrator from its collaborators
    pub fn new(
        inventory: Arc<dyn InventorySource>,
        transport: Arc<dyn TelemetryTransport>,
        registry: Arc<ReporterRegistry>,
        config: &FleetConfig,
    ) -> Self {
        Self {
            resolver: MappingResolver::new(Arc::clone(&inventory))
                .with_caching(config.cache_mappings),
            collector: TelemetryCollector::new(Arc::clone(&transport))
                .with_timeout(config.query_timeout),
            comparator: Comparator::new().with_max_uptime_ticks(config.max_uptime_ticks),
            router: ReportRouter::new(registry),
            transport_type: transport.transport_type(),
            concurrency: config.concurrency.max(1),
            inventory,
        }
    }

    #[must_use]
    pub fn resolver(&self) -> &MappingResolver {
        &self.resolver
    }

    /// Fetch the device set and check it
    ///
    /// # Errors
    /// Returns `InventoryAccess` if the device list cannot be read, or any
    /// fatal error raised while checking the fleet.
    #[instrument(
        skip(self, filter),
        fields(source = self.inventory.source_type(), transport = self.transport_type)
    )]
    pub async fn run(&self, filter: &DeviceFilter) -> Result<FleetReport, CoreError> {
        let devices = self
            .inventory
            .list_devices(filter)
            .await
            .map_err(|e| CoreError::InventoryAccess(e.to_string()))?;

        info!(devices = devices.len(), "fetched device list");

        self.check_fleet(devices).await
    }

    /// Check an already fetched device set
    ///
    /// # Errors
    /// Returns the first fatal error; remaining device work is cancelled.
    pub async fn check_fleet(&self, devices: Vec<RawDevice>) -> Result<FleetReport, CoreError> {
        let started_at = Utc::now();
        let clock = Instant::now();
        let mut report = FleetReport::new(started_at, devices.len());

        info!(
            devices = devices.len(),
            concurrency = self.concurrency,
            "starting compliance pass"
        );

        let mut outcomes = stream::iter(devices.iter())
            .map(|raw| self.process(raw))
            .buffer_unordered(self.concurrency);

        while let Some(outcome) = outcomes.next().await {
            match outcome {
                Ok(DeviceOutcome::Compliant(name)) => report.compliant.push(name),
                Ok(DeviceOutcome::Failed {
                    failure,
                    undelivered,
                }) => {
                    report.undelivered_reports += undelivered;
                    report.failed.push(failure);
                }
                // Surfaced by the caller; pending device work is dropped
                Err(e) => return Err(e),
            }
        }

        report.compliant.sort();
        report
            .failed
            .sort_by(|a, b| a.device.cmp(&b.device).then(a.kind.cmp(&b.kind)));
        report.elapsed_ms = u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX);

        info!(
            total = report.total,
            compliant = report.compliant.len(),
            failed = report.failed.len(),
            elapsed_ms = report.elapsed_ms,
            "compliance pass finished"
        );

        Ok(report)
    }

    /// Run every stage for one device
    ///
    /// # Errors
    /// Returns the first stage failure, or a fatal error.
    #[instrument(skip(self, raw), fields(device = %raw.display_name()))]
    pub async fn check_device(&self, raw: &RawDevice) -> Result<DeviceRecord, PassError> {
        let record = validate_device(raw)?;
        let map = self.resolver.resolve(&record).await?;
        let live = self.collector.collect(&record, &map).await?;
        self.comparator.compare(&record, &live)?;
        Ok(record)
    }

    async fn process(&self, raw: &RawDevice) -> Result<DeviceOutcome, CoreError> {
        match self.check_device(raw).await {
            Ok(record) => {
                info!(device = %record.name(), "device compliant");
                Ok(DeviceOutcome::Compliant(record.name().to_string()))
            }
            Err(PassError::Compliance(failure)) => {
                info!(
                    device = %failure.device,
                    kind = %failure.kind,
                    "device failed compliance"
                );
                let failed = FailedDevice {
                    device: failure.device.clone(),
                    kind: failure.kind,
                    message: failure.message.clone(),
                };
                let summary = self.router.dispatch(failure).await?;
                Ok(DeviceOutcome::Failed {
                    failure: failed,
                    undelivered: summary.failed,
                })
            }
            Err(PassError::Fatal(e)) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(device: &str, kind: ErrorKind) -> FailedDevice {
        FailedDevice {
            device: device.to_string(),
            kind,
            message: String::new(),
        }
    }

    #[test]
    fn test_failures_by_kind() {
        let mut report = FleetReport::new(Utc::now(), 4);
        report.compliant.push("sw04".to_string());
        report.failed = vec![
            failed("sw01", ErrorKind::CollectorTimeout),
            failed("sw02", ErrorKind::CollectorTimeout),
            failed("sw03", ErrorKind::LongUptime),
        ];

        let counts = report.failures_by_kind();
        assert_eq!(counts[&ErrorKind::CollectorTimeout], 2);
        assert_eq!(counts[&ErrorKind::LongUptime], 1);
        assert!(!report.is_fully_compliant());
    }
}
