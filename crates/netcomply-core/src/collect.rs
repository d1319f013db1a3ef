//! Live attribute collection

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use netcomply_transport::{QueryError, TelemetryTransport};
use tracing::{debug, instrument};

use crate::taxonomy::{ComplianceError, ErrorKind};
use crate::types::{Attribute, AttributeQueryMap, DeviceRecord, LiveSnapshot};

/// Collects a [`LiveSnapshot`] from a device
///
/// Attributes are queried one at a time in [`Attribute::ALL`] order. The first
/// failing query aborts collection and nothing collected so far is returned.
pub struct TelemetryCollector {
    transport: Arc<dyn TelemetryTransport>,
    timeout: Duration,
}

impl TelemetryCollector {
    /// Create a new collector
    pub fn new(transport: Arc<dyn TelemetryTransport>) -> Self {
        Self {
            transport,
            timeout: Duration::from_secs(5),
        }
    }

    /// Set per-query timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Collect every tracked attribute from `device`
    ///
    /// # Errors
    /// Returns a `Collector*` [`ComplianceError`] for the first failing query.
    #[instrument(
        skip(self, device, map),
        fields(device = %device.name(), address = %device.address())
    )]
    pub async fn collect(
        &self,
        device: &DeviceRecord,
        map: &AttributeQueryMap,
    ) -> Result<LiveSnapshot, ComplianceError> {
        let serial_number = self.fetch(device, map, Attribute::SerialNumber).await?;
        let system_name = self.fetch(device, map, Attribute::SystemName).await?;
        let hardware_model = self.fetch(device, map, Attribute::HardwareModel).await?;
        let sw_version = self.fetch(device, map, Attribute::SwVersion).await?;
        let sys_uptime = self.fetch(device, map, Attribute::SysUptime).await?;

        let sys_uptime = parse_uptime(&sys_uptime).map_err(|e| {
            ComplianceError::new(
                ErrorKind::CollectorOtherError,
                device.name(),
                format!("{} - uptime value is not an integer", device.name()),
            )
            .with_attribute(Attribute::SysUptime)
            .with_query(map.identifier(Attribute::SysUptime), map.device_type())
            .with_detail(format!("{sys_uptime:?}: {e}"))
        })?;

        let snapshot = LiveSnapshot {
            serial_number: serial_number.trim().to_string(),
            system_name: short_system_name(&system_name),
            hardware_model: hardware_model.trim().to_string(),
            sw_version: sw_version.trim().to_string(),
            sys_uptime,
        };

        debug!(?snapshot, "collected live attributes");

        Ok(snapshot)
    }

    async fn fetch(
        &self,
        device: &DeviceRecord,
        map: &AttributeQueryMap,
        attribute: Attribute,
    ) -> Result<String, ComplianceError> {
        let identifier = map.identifier(attribute);

        debug!(%attribute, identifier, "querying attribute");

        self.transport
            .query(IpAddr::V4(device.address()), identifier, self.timeout)
            .await
            .map_err(|e| classify(device, map, attribute, e))
    }
}

/// Map a transport failure onto the error taxonomy
fn classify(
    device: &DeviceRecord,
    map: &AttributeQueryMap,
    attribute: Attribute,
    error: QueryError,
) -> ComplianceError {
    let name = device.name();
    let identifier = map.identifier(attribute);

    let (kind, message) = match &error {
        QueryError::Timeout { .. } => (
            ErrorKind::CollectorTimeout,
            format!("{name} - query timed out, check connectivity"),
        ),
        QueryError::AuthFailure(_) => (
            ErrorKind::CollectorAuthFailure,
            format!("{name} - authentication rejected, check credentials"),
        ),
        QueryError::NoSuchObject(_) | QueryError::InvalidIdentifier(_) => (
            ErrorKind::CollectorBadIdentifier,
            format!("{name} - no such object at device, check identifier for {attribute}"),
        ),
        QueryError::Other(_) => (
            ErrorKind::CollectorOtherError,
            format!("{name} - unexpected protocol error while collecting {attribute}"),
        ),
    };

    ComplianceError::new(kind, name, message)
        .with_attribute(attribute)
        .with_query(identifier, map.device_type())
        .with_detail(error.to_string())
}

/// Host part of a system name, e.g. `sw01` for `sw01.example.net`
fn short_system_name(raw: &str) -> String {
    raw.split('.').next().unwrap_or_default().trim().to_string()
}

/// Uptime in ticks; an empty value reads as zero
fn parse_uptime(raw: &str) -> Result<u64, std::num::ParseIntError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed.parse()
}
