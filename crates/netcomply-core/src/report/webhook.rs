//! HTTP webhook sink

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::{ReportError, ReportRecord, Reporter};
use crate::taxonomy::ComplianceError;

/// POSTs each error as JSON to a fixed URL
#[derive(Debug, Clone)]
pub struct WebhookReporter {
    name: String,
    client: Client,
    url: Url,
    timeout: Duration,
}

impl WebhookReporter {
    pub fn new(url: Url) -> Self {
        Self::with_client(url, Client::new())
    }

    pub fn with_client(url: Url, client: Client) -> Self {
        Self {
            name: "webhook".to_string(),
            client,
            url,
            timeout: Duration::from_secs(10),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl Reporter for WebhookReporter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn report(&self, error: &ComplianceError) -> Result<(), ReportError> {
        let response = self
            .client
            .post(self.url.clone())
            .timeout(self.timeout)
            .json(&ReportRecord::now(error))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ReportError::Rejected { status, message });
        }

        Ok(())
    }
}
