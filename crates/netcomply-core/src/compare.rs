//! Inventory against live reconciliation

use tracing::debug;

use crate::taxonomy::{ComplianceError, ErrorKind};
use crate::types::{Attribute, DeviceRecord, LiveSnapshot};

/// 365 days in hundredths of a second
pub const MAX_UPTIME_TICKS: u64 = 3_153_600_000;

/// Comparison stages, evaluated in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    SerialNumber,
    Hostname,
    HardwareModel,
    SoftwareVersion,
    Uptime,
}

impl Check {
    pub const SEQUENCE: [Check; 5] = [
        Check::SerialNumber,
        Check::Hostname,
        Check::HardwareModel,
        Check::SoftwareVersion,
        Check::Uptime,
    ];

    /// Kind raised when this stage fails
    #[must_use]
    pub fn failure_kind(self) -> ErrorKind {
        match self {
            Check::SerialNumber => ErrorKind::SerialNumberMismatch,
            Check::Hostname => ErrorKind::HostnameMismatch,
            Check::HardwareModel => ErrorKind::HardwareModelMismatch,
            Check::SoftwareVersion => ErrorKind::SoftwareVersionMismatch,
            Check::Uptime => ErrorKind::LongUptime,
        }
    }

    fn attribute(self) -> Attribute {
        match self {
            Check::SerialNumber => Attribute::SerialNumber,
            Check::Hostname => Attribute::SystemName,
            Check::HardwareModel => Attribute::HardwareModel,
            Check::SoftwareVersion => Attribute::SwVersion,
            Check::Uptime => Attribute::SysUptime,
        }
    }
}

/// Reconciles a validated record with a complete snapshot
///
/// Text comparisons are exact after trimming; case and punctuation are
/// significant. The first failing stage ends the comparison.
#[derive(Debug, Clone, Copy)]
pub struct Comparator {
    max_uptime_ticks: u64,
}

impl Default for Comparator {
    fn default() -> Self {
        Self {
            max_uptime_ticks: MAX_UPTIME_TICKS,
        }
    }
}

impl Comparator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the uptime bound in hundredths of a second (exclusive)
    #[must_use]
    pub fn with_max_uptime_ticks(mut self, ticks: u64) -> Self {
        self.max_uptime_ticks = ticks;
        self
    }

    /// Compare every stage in order
    ///
    /// # Errors
    /// Returns the mismatch of the first failing stage, carrying both values.
    pub fn compare(
        &self,
        device: &DeviceRecord,
        live: &LiveSnapshot,
    ) -> Result<(), ComplianceError> {
        for check in Check::SEQUENCE {
            self.evaluate(check, device, live)?;
        }

        debug!(device = %device.name(), "all checks passed");

        Ok(())
    }

    fn evaluate(
        &self,
        check: Check,
        device: &DeviceRecord,
        live: &LiveSnapshot,
    ) -> Result<(), ComplianceError> {
        let name = device.name();

        let (expected, observed, passed, what) = match check {
            Check::SerialNumber => {
                text(device.serial(), &live.serial_number, "serial numbers")
            }
            Check::Hostname => text(device.name(), &live.system_name, "hostnames"),
            Check::HardwareModel => {
                text(device.device_type(), &live.hardware_model, "hardware models")
            }
            Check::SoftwareVersion => {
                text(device.platform(), &live.sw_version, "software versions")
            }
            Check::Uptime => {
                return if live.sys_uptime < self.max_uptime_ticks {
                    Ok(())
                } else {
                    Err(ComplianceError::new(
                        check.failure_kind(),
                        name,
                        format!("{name} - uptime exceeds the allowed maximum"),
                    )
                    .with_attribute(check.attribute())
                    .with_values(
                        format!("< {}", self.max_uptime_ticks),
                        live.sys_uptime.to_string(),
                    ))
                };
            }
        };

        if passed {
            return Ok(());
        }

        Err(ComplianceError::new(
            check.failure_kind(),
            name,
            format!("{name} - {what} do not match"),
        )
        .with_attribute(check.attribute())
        .with_values(expected, observed))
    }
}

fn text<'a>(
    inventory: &'a str,
    live: &'a str,
    what: &'static str,
) -> (&'a str, &'a str, bool, &'static str) {
    let inventory = inventory.trim();
    let live = live.trim();
    (inventory, live, inventory == live, what)
}
