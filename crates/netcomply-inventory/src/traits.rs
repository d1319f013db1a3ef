//! Inventory source trait

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{DeviceFilter, DeviceTypeRecord, RawDevice};

/// Authoritative device inventory
///
/// Implementations own authentication and pagination. Records are returned
/// raw; completeness is checked by the caller.
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// List every device matching `filter`
    async fn list_devices(&self, filter: &DeviceFilter) -> Result<Vec<RawDevice>>;

    /// Look up a device type by its model name
    ///
    /// Returns `Ok(None)` when the inventory has no such device type.
    async fn get_device_type(&self, model: &str) -> Result<Option<DeviceTypeRecord>>;

    /// Short name of the backing system, used in logs
    fn source_type(&self) -> &'static str;
}
