//! netcomply-transport: live telemetry transport abstraction
//!
//! Provides the trait used to query a single attribute from a device and an
//! SNMP implementation of it (v3 USM or v2c community).

pub mod error;
pub mod oid;
pub mod snmp;
pub mod traits;

pub use error::QueryError;
pub use oid::parse_oid;
pub use snmp::{SnmpSecurity, SnmpSettings, SnmpTransport, UsmCredentials};
pub use traits::TelemetryTransport;
