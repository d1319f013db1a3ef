//! NetBox REST client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};
use url::Url;

use crate::error::{InventoryError, Result};
use crate::traits::InventorySource;
use crate::types::{DeviceFilter, DeviceTypeRecord, Page, RawDevice};

const DEVICES_PATH: &str = "api/dcim/devices/";
const DEVICE_TYPES_PATH: &str = "api/dcim/device-types/";

/// Inventory source backed by the NetBox API
#[derive(Clone)]
pub struct NetboxClient {
    client: Client,
    base_url: Url,
    token: String,
    timeout: Duration,
    page_size: usize,
}

impl std::fmt::Debug for NetboxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetboxClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

impl NetboxClient {
    /// Create a new client
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the token is empty.
    pub fn new(base_url: impl AsRef<str>, token: impl Into<String>) -> Result<Self> {
        Self::with_client(base_url, token, Client::new())
    }

    /// Create a new client with a custom `reqwest::Client`
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the token is empty.
    pub fn with_client(
        base_url: impl AsRef<str>,
        token: impl Into<String>,
        client: Client,
    ) -> Result<Self> {
        let mut raw = base_url.as_ref().trim().to_string();
        // Url::join drops the last path segment unless it ends with a slash
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base_url = Url::parse(&raw)?;

        let token = token.into();
        if token.trim().is_empty() {
            return Err(InventoryError::ConfigError("API token is empty".to_string()));
        }

        Ok(Self {
            client,
            base_url,
            token,
            timeout: Duration::from_secs(30),
            page_size: 250,
        })
    }

    /// Set per-request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set list page size
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// URL of the first device list page for `filter`
    ///
    /// # Errors
    /// Returns an error if the URL cannot be built.
    pub fn devices_url(&self, filter: &DeviceFilter) -> Result<Url> {
        let mut url = self.base_url.join(DEVICES_PATH)?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in filter.query_pairs() {
                query.append_pair(key, value);
            }
            query.append_pair("limit", &self.page_size.to_string());
        }
        Ok(url)
    }

    /// URL of the device type lookup for `model`
    ///
    /// # Errors
    /// Returns an error if the URL cannot be built.
    pub fn device_type_url(&self, model: &str) -> Result<Url> {
        let mut url = self.base_url.join(DEVICE_TYPES_PATH)?;
        url.query_pairs_mut().append_pair("model", model);
        Ok(url)
    }

    /// Perform an authenticated GET and deserialize the response
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(url = %url, "inventory request");

        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("Token {}", self.token))
            .header(ACCEPT, "application/json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(InventoryError::Api { status, message });
        }

        response.json().await.map_err(|e| self.map_request_error(e))
    }

    fn map_request_error(&self, e: reqwest::Error) -> InventoryError {
        if e.is_timeout() {
            InventoryError::Timeout(self.timeout)
        } else if e.is_decode() {
            InventoryError::InvalidResponse(e.to_string())
        } else {
            InventoryError::Http(e)
        }
    }
}

#[async_trait]
impl InventorySource for NetboxClient {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn list_devices(&self, filter: &DeviceFilter) -> Result<Vec<RawDevice>> {
        let mut devices = Vec::new();
        let mut next = Some(self.devices_url(filter)?);

        while let Some(url) = next.take() {
            let page: Page<RawDevice> = self.get(url).await?;
            debug!(
                fetched = page.results.len(),
                total = page.count,
                "received device page"
            );
            devices.extend(page.results);
            next = page.next.as_deref().map(Url::parse).transpose()?;
        }

        info!(count = devices.len(), "listed inventory devices");

        Ok(devices)
    }

    #[instrument(skip(self))]
    async fn get_device_type(&self, model: &str) -> Result<Option<DeviceTypeRecord>> {
        let url = self.device_type_url(model)?;
        let page: Page<DeviceTypeRecord> = self.get(url).await?;

        Ok(page.results.into_iter().find(|dt| dt.model == model))
    }

    fn source_type(&self) -> &'static str {
        "netbox"
    }
}
