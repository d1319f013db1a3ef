//! Inventory record definitions
//!
//! Shapes follow the NetBox REST API so responses deserialize directly. Every
//! attribute the compliance engine needs is optional here: a record is raw
//! until it has been validated.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Devices
// ============================================================================

/// Device record as returned by the inventory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDevice {
    /// Inventory-side numeric identifier
    #[serde(default)]
    pub id: u64,
    /// Device name (hostname)
    #[serde(default)]
    pub name: Option<String>,
    /// Serial number
    #[serde(default)]
    pub serial: Option<String>,
    /// Primary management IPv4 address, in CIDR notation
    #[serde(default)]
    pub primary_ip4: Option<IpAddressRef>,
    /// Hardware model
    #[serde(default)]
    pub device_type: Option<DeviceTypeRef>,
    /// Software platform
    #[serde(default)]
    pub platform: Option<PlatformRef>,
}

impl RawDevice {
    /// Name used to identify the device in logs and reports
    ///
    /// Falls back to the inventory id when the record has no usable name.
    #[must_use]
    pub fn display_name(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("device #{}", self.id),
        }
    }
}

/// Nested IP address object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IpAddressRef {
    #[serde(default)]
    pub id: u64,
    /// Address with prefix length, e.g. `10.0.0.1/24`
    pub address: String,
}

/// Nested device type object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceTypeRef {
    #[serde(default)]
    pub id: u64,
    /// Model name
    pub model: String,
}

/// Nested platform object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformRef {
    #[serde(default)]
    pub id: u64,
    /// Platform name, expected to carry the software version
    pub name: String,
}

// ============================================================================
// Device types
// ============================================================================

/// Full device type record, including custom attributes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceTypeRecord {
    #[serde(default)]
    pub id: u64,
    /// Model name
    pub model: String,
    /// Custom attribute map; values may be null
    #[serde(default)]
    pub custom_fields: HashMap<String, Value>,
}

impl DeviceTypeRecord {
    /// Get a custom field as text
    ///
    /// Null, non-string and blank values are reported as absent.
    #[must_use]
    pub fn custom_field_str(&self, key: &str) -> Option<&str> {
        self.custom_fields
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

// ============================================================================
// Queries
// ============================================================================

/// Paginated list response
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    /// Total number of matching objects
    #[serde(default)]
    pub count: usize,
    /// URL of the next page, if any
    pub next: Option<String>,
    /// Objects on this page
    pub results: Vec<T>,
}

/// Selection of devices to list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceFilter {
    /// Operational status (e.g. `active`)
    #[serde(default)]
    pub status: Option<String>,
    /// Device role slugs; any match selects the device
    #[serde(default)]
    pub roles: Vec<String>,
    /// Explicit device names; empty means no name restriction
    #[serde(default)]
    pub names: Vec<String>,
}

impl DeviceFilter {
    /// Filter selecting active devices
    #[must_use]
    pub fn active() -> Self {
        Self {
            status: Some("active".to_string()),
            ..Self::default()
        }
    }

    /// Add a role slug
    #[must_use]
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    /// Restrict to a named device
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    /// Query string pairs understood by the NetBox device list endpoint
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = Vec::new();
        if let Some(ref status) = self.status {
            pairs.push(("status", status.as_str()));
        }
        pairs.extend(self.roles.iter().map(|r| ("role", r.as_str())));
        pairs.extend(self.names.iter().map(|n| ("name", n.as_str())));
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_device_page() {
        let body = json!({
            "count": 2,
            "next": null,
            "previous": null,
            "results": [
                {
                    "id": 11,
                    "name": "sw01",
                    "serial": "ABC123",
                    "primary_ip4": {"id": 4, "address": "10.0.0.11/24", "family": 4},
                    "device_type": {"id": 3, "model": "C9300-48P", "slug": "c9300-48p"},
                    "platform": {"id": 7, "name": "17.9.4", "slug": "17-9-4"},
                    "status": {"value": "active", "label": "Active"}
                },
                {
                    "id": 12,
                    "name": null,
                    "serial": "",
                    "primary_ip4": null,
                    "device_type": {"id": 3, "model": "C9300-48P"},
                    "platform": null
                }
            ]
        });

        let page: Page<RawDevice> = serde_json::from_value(body).unwrap();
        assert_eq!(page.count, 2);
        assert!(page.next.is_none());

        let first = &page.results[0];
        assert_eq!(first.name.as_deref(), Some("sw01"));
        assert_eq!(first.primary_ip4.as_ref().unwrap().address, "10.0.0.11/24");
        assert_eq!(first.device_type.as_ref().unwrap().model, "C9300-48P");
        assert_eq!(first.platform.as_ref().unwrap().name, "17.9.4");

        let second = &page.results[1];
        assert!(second.name.is_none());
        assert!(second.primary_ip4.is_none());
        assert!(second.platform.is_none());
        assert_eq!(second.display_name(), "device #12");
    }

    #[test]
    fn test_custom_field_str() {
        let record: DeviceTypeRecord = serde_json::from_value(json!({
            "id": 3,
            "model": "C9300-48P",
            "custom_fields": {
                "snmp_sn_oid": " 1.3.6.1.2.1.47.1.1.1.1.11.1000 ",
                "snmp_sysname_oid": null,
                "snmp_hwmodel_oid": "",
                "snmp_swversion_oid": 42
            }
        }))
        .unwrap();

        assert_eq!(
            record.custom_field_str("snmp_sn_oid"),
            Some("1.3.6.1.2.1.47.1.1.1.1.11.1000")
        );
        assert_eq!(record.custom_field_str("snmp_sysname_oid"), None);
        assert_eq!(record.custom_field_str("snmp_hwmodel_oid"), None);
        assert_eq!(record.custom_field_str("snmp_swversion_oid"), None);
        assert_eq!(record.custom_field_str("snmp_sysuptime_oid"), None);
    }

    #[test]
    fn test_filter_query_pairs() {
        let filter = DeviceFilter::active().role("sw").role("rt").name("sw01");
        assert_eq!(
            filter.query_pairs(),
            vec![
                ("status", "active"),
                ("role", "sw"),
                ("role", "rt"),
                ("name", "sw01")
            ]
        );
    }

    #[test]
    fn test_display_name_trims() {
        let device = RawDevice {
            id: 5,
            name: Some("  ".to_string()),
            ..RawDevice::default()
        };
        assert_eq!(device.display_name(), "device #5");
    }
}
