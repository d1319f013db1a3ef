//! Compliance data model

use std::fmt;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

// ============================================================================
// Attributes
// ============================================================================

/// Device attribute tracked for compliance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    SerialNumber,
    SystemName,
    HardwareModel,
    SwVersion,
    SysUptime,
}

impl Attribute {
    /// Every tracked attribute, in collection order
    pub const ALL: [Attribute; 5] = [
        Attribute::SerialNumber,
        Attribute::SystemName,
        Attribute::HardwareModel,
        Attribute::SwVersion,
        Attribute::SysUptime,
    ];

    /// Attribute name as used in reports
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Attribute::SerialNumber => "serial_number",
            Attribute::SystemName => "system_name",
            Attribute::HardwareModel => "hardware_model",
            Attribute::SwVersion => "sw_version",
            Attribute::SysUptime => "sys_uptime",
        }
    }

    /// Device-type custom field holding the query identifier for this attribute
    #[must_use]
    pub fn custom_field(self) -> &'static str {
        match self {
            Attribute::SerialNumber => "snmp_sn_oid",
            Attribute::SystemName => "snmp_sysname_oid",
            Attribute::HardwareModel => "snmp_hwmodel_oid",
            Attribute::SwVersion => "snmp_swversion_oid",
            Attribute::SysUptime => "snmp_sysuptime_oid",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Inventory snapshot
// ============================================================================

/// Validated inventory record
///
/// Only produced by [`validate_device`](crate::validate::validate_device);
/// every field is present and non-empty, and the record is immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceRecord {
    name: String,
    address: Ipv4Addr,
    serial: String,
    device_type: String,
    platform: String,
}

impl DeviceRecord {
    pub(crate) fn new(
        name: String,
        address: Ipv4Addr,
        serial: String,
        device_type: String,
        platform: String,
    ) -> Self {
        Self {
            name,
            address,
            serial,
            device_type,
            platform,
        }
    }

    /// Device name (hostname)
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Primary management address
    #[must_use]
    pub fn address(&self) -> Ipv4Addr {
        self.address
    }

    /// Serial number
    #[must_use]
    pub fn serial(&self) -> &str {
        &self.serial
    }

    /// Device type (hardware model) identifier
    #[must_use]
    pub fn device_type(&self) -> &str {
        &self.device_type
    }

    /// Platform (software version) identifier
    #[must_use]
    pub fn platform(&self) -> &str {
        &self.platform
    }
}

// ============================================================================
// Query mapping
// ============================================================================

/// Query identifiers for every tracked attribute of one device type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeQueryMap {
    device_type: String,
    serial_number: String,
    system_name: String,
    hardware_model: String,
    sw_version: String,
    sys_uptime: String,
}

impl AttributeQueryMap {
    /// Build a map from identifiers given in [`Attribute::ALL`] order
    pub(crate) fn new(device_type: impl Into<String>, identifiers: [String; 5]) -> Self {
        let [serial_number, system_name, hardware_model, sw_version, sys_uptime] = identifiers;
        Self {
            device_type: device_type.into(),
            serial_number,
            system_name,
            hardware_model,
            sw_version,
            sys_uptime,
        }
    }

    /// Device type the map was resolved for
    #[must_use]
    pub fn device_type(&self) -> &str {
        &self.device_type
    }

    /// Query identifier for `attribute`
    #[must_use]
    pub fn identifier(&self, attribute: Attribute) -> &str {
        match attribute {
            Attribute::SerialNumber => &self.serial_number,
            Attribute::SystemName => &self.system_name,
            Attribute::HardwareModel => &self.hardware_model,
            Attribute::SwVersion => &self.sw_version,
            Attribute::SysUptime => &self.sys_uptime,
        }
    }
}

// ============================================================================
// Live telemetry
// ============================================================================

/// Normalized attribute values collected from a device
///
/// All fields are required, so a snapshot is always complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveSnapshot {
    pub serial_number: String,
    /// Host part of the system name, domain suffix removed
    pub system_name: String,
    pub hardware_model: String,
    pub sw_version: String,
    /// Uptime in hundredths of a second
    pub sys_uptime: u64,
}
