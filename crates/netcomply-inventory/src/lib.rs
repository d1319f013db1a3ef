//! netcomply-inventory: source-of-truth access
//!
//! Defines the inventory collaborator consumed by the compliance engine and a
//! NetBox implementation of it.
//!
//! # Example
//!
//! ```no_run
//! use netcomply_inventory::{DeviceFilter, InventorySource, NetboxClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = NetboxClient::new("https://netbox.example.net", "0123456789abcdef")?;
//! let filter = DeviceFilter::active().role("sw");
//! for device in client.list_devices(&filter).await? {
//!     println!("{}", device.display_name());
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod netbox;
pub mod traits;
pub mod types;

pub use error::{InventoryError, Result};
pub use netbox::NetboxClient;
pub use traits::InventorySource;
pub use types::{
    DeviceFilter, DeviceTypeRecord, DeviceTypeRef, IpAddressRef, Page, PlatformRef, RawDevice,
};
