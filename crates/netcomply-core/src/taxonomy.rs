//! Error taxonomy for compliance passes

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Attribute;

/// Named classification of a compliance failure
///
/// The string form of each kind is stable; it is what routes and reports use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Device type lacks one or more query identifiers
    MappingIncomplete,

    #[serde(rename = "MissingIPv4")]
    MissingIpv4,
    MissingSerial,
    MissingHostname,
    MissingDeviceType,
    MissingPlatform,

    CollectorTimeout,
    CollectorAuthFailure,
    CollectorBadIdentifier,
    CollectorOtherError,

    SerialNumberMismatch,
    HostnameMismatch,
    HardwareModelMismatch,
    SoftwareVersionMismatch,
    LongUptime,

    /// No reporter registered for a kind (fatal)
    UnregisteredErrorKind,
    /// Inventory could not be read (fatal)
    InventoryAccessFailure,
}

/// Broad grouping of error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Mapping,
    Inventory,
    Transport,
    Reconciliation,
    Fatal,
}

impl ErrorKind {
    /// Every kind
    pub const ALL: [ErrorKind; 17] = [
        ErrorKind::MappingIncomplete,
        ErrorKind::MissingIpv4,
        ErrorKind::MissingSerial,
        ErrorKind::MissingHostname,
        ErrorKind::MissingDeviceType,
        ErrorKind::MissingPlatform,
        ErrorKind::CollectorTimeout,
        ErrorKind::CollectorAuthFailure,
        ErrorKind::CollectorBadIdentifier,
        ErrorKind::CollectorOtherError,
        ErrorKind::SerialNumberMismatch,
        ErrorKind::HostnameMismatch,
        ErrorKind::HardwareModelMismatch,
        ErrorKind::SoftwareVersionMismatch,
        ErrorKind::LongUptime,
        ErrorKind::UnregisteredErrorKind,
        ErrorKind::InventoryAccessFailure,
    ];

    /// Kinds raised for a single device and routed to reporters
    pub const PER_DEVICE: [ErrorKind; 15] = [
        ErrorKind::MappingIncomplete,
        ErrorKind::MissingIpv4,
        ErrorKind::MissingSerial,
        ErrorKind::MissingHostname,
        ErrorKind::MissingDeviceType,
        ErrorKind::MissingPlatform,
        ErrorKind::CollectorTimeout,
        ErrorKind::CollectorAuthFailure,
        ErrorKind::CollectorBadIdentifier,
        ErrorKind::CollectorOtherError,
        ErrorKind::SerialNumberMismatch,
        ErrorKind::HostnameMismatch,
        ErrorKind::HardwareModelMismatch,
        ErrorKind::SoftwareVersionMismatch,
        ErrorKind::LongUptime,
    ];

    /// Stable name of the kind
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::MappingIncomplete => "MappingIncomplete",
            ErrorKind::MissingIpv4 => "MissingIPv4",
            ErrorKind::MissingSerial => "MissingSerial",
            ErrorKind::MissingHostname => "MissingHostname",
            ErrorKind::MissingDeviceType => "MissingDeviceType",
            ErrorKind::MissingPlatform => "MissingPlatform",
            ErrorKind::CollectorTimeout => "CollectorTimeout",
            ErrorKind::CollectorAuthFailure => "CollectorAuthFailure",
            ErrorKind::CollectorBadIdentifier => "CollectorBadIdentifier",
            ErrorKind::CollectorOtherError => "CollectorOtherError",
            ErrorKind::SerialNumberMismatch => "SerialNumberMismatch",
            ErrorKind::HostnameMismatch => "HostnameMismatch",
            ErrorKind::HardwareModelMismatch => "HardwareModelMismatch",
            ErrorKind::SoftwareVersionMismatch => "SoftwareVersionMismatch",
            ErrorKind::LongUptime => "LongUptime",
            ErrorKind::UnregisteredErrorKind => "UnregisteredErrorKind",
            ErrorKind::InventoryAccessFailure => "InventoryAccessFailure",
        }
    }

    #[must_use]
    pub fn category(self) -> Category {
        match self {
            ErrorKind::MappingIncomplete => Category::Mapping,
            ErrorKind::MissingIpv4
            | ErrorKind::MissingSerial
            | ErrorKind::MissingHostname
            | ErrorKind::MissingDeviceType
            | ErrorKind::MissingPlatform => Category::Inventory,
            ErrorKind::CollectorTimeout
            | ErrorKind::CollectorAuthFailure
            | ErrorKind::CollectorBadIdentifier
            | ErrorKind::CollectorOtherError => Category::Transport,
            ErrorKind::SerialNumberMismatch
            | ErrorKind::HostnameMismatch
            | ErrorKind::HardwareModelMismatch
            | ErrorKind::SoftwareVersionMismatch
            | ErrorKind::LongUptime => Category::Reconciliation,
            ErrorKind::UnregisteredErrorKind | ErrorKind::InventoryAccessFailure => Category::Fatal,
        }
    }

    /// Whether this kind aborts the whole run
    #[must_use]
    pub fn is_fatal(self) -> bool {
        self.category() == Category::Fatal
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown error kind name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown error kind: {0}")]
pub struct UnknownErrorKind(pub String);

impl FromStr for ErrorKind {
    type Err = UnknownErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownErrorKind(s.to_string()))
    }
}

// ============================================================================
// ComplianceError
// ============================================================================

/// Structured context attached to a compliance failure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Attribute being checked or collected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<Attribute>,
    /// Query identifier sent to the device
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_identifier: Option<String>,
    /// Device type the identifiers were looked up for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
    /// Expected value from the inventory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory_value: Option<String>,
    /// Value observed on the device
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_value: Option<String>,
    /// Underlying cause, free text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A classified failure of one device's compliance pass
///
/// Created where the failure is detected and handed by value to the router.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct ComplianceError {
    pub kind: ErrorKind,
    /// Identity of the device the failure belongs to
    pub device: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "ErrorContext::is_empty")]
    pub context: ErrorContext,
}

impl ComplianceError {
    /// Create an error without context
    pub fn new(kind: ErrorKind, device: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            device: device.into(),
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.context.attribute = Some(attribute);
        self
    }

    /// Attach the identifier sent and the device type it came from
    #[must_use]
    pub fn with_query(
        mut self,
        identifier: impl Into<String>,
        device_type: impl Into<String>,
    ) -> Self {
        self.context.query_identifier = Some(identifier.into());
        self.context.device_type = Some(device_type.into());
        self
    }

    #[must_use]
    pub fn with_device_type(mut self, device_type: impl Into<String>) -> Self {
        self.context.device_type = Some(device_type.into());
        self
    }

    /// Attach both compared values
    #[must_use]
    pub fn with_values(mut self, inventory: impl Into<String>, live: impl Into<String>) -> Self {
        self.context.inventory_value = Some(inventory.into());
        self.context.live_value = Some(live.into());
        self
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.context.detail = Some(detail.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_round_trip() {
        for kind in ErrorKind::ALL {
            assert_eq!(kind.as_str().parse::<ErrorKind>(), Ok(kind));
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_unknown_kind() {
        assert_eq!(
            "MissingDataIPv4".parse::<ErrorKind>(),
            Err(UnknownErrorKind("MissingDataIPv4".to_string()))
        );
    }

    #[test]
    fn test_per_device_kinds_are_not_fatal() {
        assert!(ErrorKind::PER_DEVICE.iter().all(|k| !k.is_fatal()));
        assert!(ErrorKind::UnregisteredErrorKind.is_fatal());
        assert!(ErrorKind::InventoryAccessFailure.is_fatal());
        assert_eq!(
            ErrorKind::ALL.iter().filter(|k| !k.is_fatal()).count(),
            ErrorKind::PER_DEVICE.len()
        );
    }

    #[test]
    fn test_error_serialization_skips_empty_context() {
        let bare = ComplianceError::new(
            ErrorKind::MissingSerial,
            "sw01",
            "sw01 is missing a serial number",
        );
        let json = serde_json::to_value(&bare).unwrap();
        assert_eq!(json["kind"], "MissingSerial");
        assert!(json.get("context").is_none());

        let rich = ComplianceError::new(ErrorKind::SerialNumberMismatch, "sw01", "mismatch")
            .with_attribute(Attribute::SerialNumber)
            .with_values("ABC123", "abc123");
        let json = serde_json::to_value(&rich).unwrap();
        assert_eq!(json["context"]["attribute"], "serial_number");
        assert_eq!(json["context"]["inventory_value"], "ABC123");
        assert_eq!(json["context"]["live_value"], "abc123");
        assert_eq!(rich.to_string(), "mismatch");
    }
}
