//! Telemetry transport trait

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::QueryError;

/// Read-only attribute query against a device
///
/// Implementations must honour `timeout` and must not retry. Dropping the
/// returned future abandons the in-flight query.
#[async_trait]
pub trait TelemetryTransport: Send + Sync {
    /// Fetch the raw value stored under `identifier` on the device at `address`
    async fn query(
        &self,
        address: IpAddr,
        identifier: &str,
        timeout: Duration,
    ) -> Result<String, QueryError>;

    /// Short name of the protocol, used in logs
    fn transport_type(&self) -> &'static str;
}
