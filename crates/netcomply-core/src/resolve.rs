//! Device type to query identifier resolution

use std::collections::HashMap;
use std::sync::Arc;

use netcomply_inventory::{DeviceTypeRecord, InventorySource};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::error::{CoreError, PassError};
use crate::taxonomy::{ComplianceError, ErrorKind};
use crate::types::{Attribute, AttributeQueryMap, DeviceRecord};

/// Resolves the query identifiers for a device's type
///
/// Resolved maps are cached per device type for the lifetime of the
/// resolver. Failed lookups are never cached.
pub struct MappingResolver {
    inventory: Arc<dyn InventorySource>,
    cache: RwLock<HashMap<String, AttributeQueryMap>>,
    caching: bool,
}

impl MappingResolver {
    /// Create a new resolver with caching enabled
    pub fn new(inventory: Arc<dyn InventorySource>) -> Self {
        Self {
            inventory,
            cache: RwLock::new(HashMap::new()),
            caching: true,
        }
    }

    /// Enable or disable the per-type cache
    #[must_use]
    pub fn with_caching(mut self, caching: bool) -> Self {
        self.caching = caching;
        self
    }

    /// Resolve the query map for `device`'s type
    ///
    /// # Errors
    /// Returns `MappingIncomplete` if the device type is unknown or lacks any
    /// identifier, and a fatal error if the inventory cannot be read.
    #[instrument(
        skip(self, device),
        fields(device = %device.name(), device_type = %device.device_type())
    )]
    pub async fn resolve(&self, device: &DeviceRecord) -> Result<AttributeQueryMap, PassError> {
        let device_type = device.device_type();

        if self.caching {
            let cache = self.cache.read().await;
            if let Some(map) = cache.get(device_type) {
                debug!("cache hit");
                return Ok(map.clone());
            }
        }

        let record = self
            .inventory
            .get_device_type(device_type)
            .await
            .map_err(|e| CoreError::InventoryAccess(e.to_string()))?;

        let map = match record {
            Some(record) => query_map_from_record(&record).map_err(|missing| {
                let fields: Vec<&str> = missing.iter().map(|a| a.custom_field()).collect();
                ComplianceError::new(
                    ErrorKind::MappingIncomplete,
                    device.name(),
                    format!(
                        "{} - device type {device_type} is missing query identifiers",
                        device.name()
                    ),
                )
                .with_device_type(device_type)
                .with_detail(format!("missing: {}", fields.join(", ")))
            })?,
            None => {
                return Err(ComplianceError::new(
                    ErrorKind::MappingIncomplete,
                    device.name(),
                    format!(
                        "{} - device type {device_type} not found in inventory",
                        device.name()
                    ),
                )
                .with_device_type(device_type)
                .into());
            }
        };

        if self.caching {
            let mut cache = self.cache.write().await;
            cache.insert(device_type.to_string(), map.clone());
        }

        debug!("resolved query identifiers");

        Ok(map)
    }

    /// Number of cached device types
    pub async fn cached_types(&self) -> usize {
        self.cache.read().await.len()
    }
}

/// Build a query map from a device type's custom fields
///
/// # Errors
/// Returns every attribute whose identifier is absent.
pub fn query_map_from_record(
    record: &DeviceTypeRecord,
) -> Result<AttributeQueryMap, Vec<Attribute>> {
    let identifiers = Attribute::ALL.map(|a| record.custom_field_str(a.custom_field()));

    let missing: Vec<Attribute> = Attribute::ALL
        .into_iter()
        .zip(identifiers)
        .filter(|(_, identifier)| identifier.is_none())
        .map(|(attribute, _)| attribute)
        .collect();

    if !missing.is_empty() {
        return Err(missing);
    }

    let identifiers = identifiers.map(|id| id.unwrap_or_default().to_string());
    Ok(AttributeQueryMap::new(record.model.clone(), identifiers))
}
