//! Inventory completeness checks

use std::net::Ipv4Addr;

use netcomply_inventory::RawDevice;

use crate::taxonomy::{ComplianceError, ErrorKind};
use crate::types::DeviceRecord;

/// Check that an inventory record carries everything a compliance pass needs
///
/// Checks run in a fixed order (address, serial, name, device type, platform)
/// and stop at the first missing field. Blank values count as missing, and
/// so does an address that is not a valid IPv4 address once its prefix
/// length is removed.
///
/// # Errors
/// Returns a `Missing*` [`ComplianceError`] for the first absent field.
pub fn validate_device(raw: &RawDevice) -> Result<DeviceRecord, ComplianceError> {
    let device = raw.display_name();

    let address = match raw.primary_ip4.as_ref().map(|ip| ip.address.as_str()) {
        Some(cidr) => parse_management_address(cidr).ok_or_else(|| {
            ComplianceError::new(
                ErrorKind::MissingIpv4,
                &device,
                format!("{device} has an unusable primary IPv4 address"),
            )
            .with_detail(format!("could not parse {cidr:?}"))
        })?,
        None => {
            return Err(ComplianceError::new(
                ErrorKind::MissingIpv4,
                &device,
                format!("{device} is missing a primary IPv4 address"),
            ));
        }
    };

    let serial = present(raw.serial.as_deref()).ok_or_else(|| {
        ComplianceError::new(
            ErrorKind::MissingSerial,
            &device,
            format!("{device} is missing a serial number"),
        )
    })?;

    let name = present(raw.name.as_deref()).ok_or_else(|| {
        ComplianceError::new(
            ErrorKind::MissingHostname,
            &device,
            format!("{device} is missing a hostname"),
        )
    })?;

    let device_type = present(raw.device_type.as_ref().map(|dt| dt.model.as_str()))
        .ok_or_else(|| {
            ComplianceError::new(
                ErrorKind::MissingDeviceType,
                &device,
                format!("{device} is missing a device type"),
            )
        })?;

    let platform = present(raw.platform.as_ref().map(|p| p.name.as_str())).ok_or_else(|| {
        ComplianceError::new(
            ErrorKind::MissingPlatform,
            &device,
            format!("{device} is missing a platform"),
        )
    })?;

    Ok(DeviceRecord::new(
        name.to_string(),
        address,
        serial.to_string(),
        device_type.to_string(),
        platform.to_string(),
    ))
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Strip the prefix length from `10.0.0.1/24` style addresses
fn parse_management_address(cidr: &str) -> Option<Ipv4Addr> {
    let host = cidr.split('/').next().unwrap_or_default().trim();
    host.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use netcomply_inventory::{DeviceTypeRef, IpAddressRef, PlatformRef};

    fn complete() -> RawDevice {
        RawDevice {
            id: 1,
            name: Some("sw01".to_string()),
            serial: Some(" ABC123 ".to_string()),
            primary_ip4: Some(IpAddressRef {
                id: 9,
                address: "10.0.0.11/24".to_string(),
            }),
            device_type: Some(DeviceTypeRef {
                id: 3,
                model: "C9300-48P".to_string(),
            }),
            platform: Some(PlatformRef {
                id: 7,
                name: "17.9.4".to_string(),
            }),
        }
    }

    #[test]
    fn test_complete_record() {
        let record = validate_device(&complete()).unwrap();
        assert_eq!(record.name(), "sw01");
        assert_eq!(record.address(), Ipv4Addr::new(10, 0, 0, 11));
        assert_eq!(record.serial(), "ABC123");
        assert_eq!(record.device_type(), "C9300-48P");
        assert_eq!(record.platform(), "17.9.4");
    }

    #[test]
    fn test_each_missing_field_has_its_own_kind() {
        let cases: [(fn(&mut RawDevice), ErrorKind); 5] = [
            (|d| d.primary_ip4 = None, ErrorKind::MissingIpv4),
            (|d| d.serial = None, ErrorKind::MissingSerial),
            (|d| d.name = None, ErrorKind::MissingHostname),
            (|d| d.device_type = None, ErrorKind::MissingDeviceType),
            (|d| d.platform = None, ErrorKind::MissingPlatform),
        ];

        for (strip, expected) in cases {
            let mut raw = complete();
            strip(&mut raw);
            let err = validate_device(&raw).unwrap_err();
            assert_eq!(err.kind, expected);
        }
    }

    #[test]
    fn test_first_missing_field_wins() {
        let mut raw = complete();
        raw.serial = None;
        raw.platform = None;
        assert_eq!(
            validate_device(&raw).unwrap_err().kind,
            ErrorKind::MissingSerial
        );

        raw.primary_ip4 = None;
        assert_eq!(
            validate_device(&raw).unwrap_err().kind,
            ErrorKind::MissingIpv4
        );
    }

    #[test]
    fn test_blank_serial_is_missing() {
        let mut raw = complete();
        raw.serial = Some("   ".to_string());
        let err = validate_device(&raw).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingSerial);
        assert_eq!(err.device, "sw01");
    }

    #[test]
    fn test_unparsable_address() {
        let mut raw = complete();
        raw.primary_ip4 = Some(IpAddressRef {
            id: 9,
            address: "2001:db8::1/64".to_string(),
        });
        let err = validate_device(&raw).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingIpv4);
        assert!(err.context.detail.is_some());
    }

    #[test]
    fn test_unnamed_device_identity() {
        let mut raw = complete();
        raw.id = 42;
        raw.name = None;
        let err = validate_device(&raw).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingHostname);
        assert_eq!(err.device, "device #42");
    }
}
