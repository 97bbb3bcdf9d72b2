//! HTTP status fetcher (reqwest).

use std::time::Duration;

use async_trait::async_trait;

use apache_exporter_core::error::{ExporterError, Result};
use apache_exporter_core::StatusFetcher;

/// Loads the status page with a single GET.
///
/// Transport errors, non-2xx responses and empty bodies are fetch failures.
pub struct HttpStatusFetcher {
    client: reqwest::Client,
    url: String,
}

impl HttpStatusFetcher {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExporterError::Config(format!("http client init failed: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    fn failure(&self, reason: impl std::fmt::Display) -> ExporterError {
        ExporterError::Fetch(format!("failed to load status from {}: {reason}", self.url))
    }
}

#[async_trait]
impl StatusFetcher for HttpStatusFetcher {
    fn target(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<String> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.failure(e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(self.failure(format!("http status {status}")));
        }

        let body = resp.text().await.map_err(|e| self.failure(e))?;
        if body.is_empty() {
            return Err(self.failure("empty response"));
        }

        tracing::debug!(url = %self.url, bytes = body.len(), "status page loaded");
        Ok(body)
    }
}
