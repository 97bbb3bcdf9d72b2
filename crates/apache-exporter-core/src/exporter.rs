//! Scrape pipeline: fetch -> parse -> update, with failure accounting.
//!
//! Every invocation is independent; the registry is the only shared state.
//! Scrape failures (fetch, missing or invalid fields) are counted in
//! `apache_exporter_scrape_failures_total` and swallowed. Registration and
//! storage errors are setup defects and are returned.

use async_trait::async_trait;

use crate::error::{ExporterError, Result};
use crate::registry::{Counter, Registry, WriteBatch};
use crate::status::{parse_status, ParsedStatus};
use crate::updater::{StatusMetrics, StatusSnapshot, NAMESPACE};

/// Default `mod_status` URL (machine-readable variant).
pub const DEFAULT_STATUS_URL: &str = "http://localhost/server-status?auto";

/// Source of raw status page text.
///
/// Implementations own transport concerns (timeouts, client reuse). An empty
/// body is treated as a failed fetch by the exporter.
#[async_trait]
pub trait StatusFetcher: Send + Sync {
    /// Human-readable target (usually the URL), used in errors and logs.
    fn target(&self) -> &str;
    async fn fetch(&self) -> Result<String>;
}

/// Every exporter metric registered against one registry.
///
/// Registration happens in [`Exporter::register`], so a descriptor that
/// conflicts with the registry or its storage fails there and never on a
/// scrape.
pub struct Exporter {
    registry: Registry,
    failures: Counter,
    status: StatusMetrics,
}

impl Exporter {
    pub fn register(registry: Registry) -> Result<Self> {
        let failures = registry.register_counter(
            NAMESPACE,
            "exporter_scrape_failures_total",
            "Number of errors while scraping apache",
            &[],
        )?;
        let status = StatusMetrics::register(&registry)?;
        Ok(Self {
            registry,
            failures,
            status,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Run one scrape.
    ///
    /// Returns the parsed status on success, `None` on a counted scrape
    /// failure.
    pub async fn export(&self, fetcher: &dyn StatusFetcher) -> Result<Option<ParsedStatus>> {
        match self.scrape(fetcher).await {
            Ok(parsed) => Ok(Some(parsed)),
            Err(e) if e.is_scrape_failure() => {
                tracing::warn!(
                    target_url = fetcher.target(),
                    kind = e.kind().as_str(),
                    error = %e,
                    "scrape failed"
                );
                self.failures.inc(&[])?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn scrape(&self, fetcher: &dyn StatusFetcher) -> Result<ParsedStatus> {
        let text = fetcher.fetch().await?;
        if text.is_empty() {
            return Err(ExporterError::Fetch(format!(
                "failed to load status from {}: empty response",
                fetcher.target()
            )));
        }

        let parsed = parse_status(&text);
        let snapshot = StatusSnapshot::from_status(&parsed)?;

        let mut batch = WriteBatch::new();
        self.status.stage(&snapshot, &mut batch);
        // make sure the failure series shows up
        batch.inc_by(&self.failures, 0, &[]);
        self.registry.commit(&batch)?;

        tracing::debug!(
            accesses = snapshot.accesses,
            busy = snapshot.busy_workers,
            idle = snapshot.idle_workers,
            slots = snapshot.scoreboard.slots(),
            "registry updated"
        );
        Ok(parsed)
    }
}

/// Register the exporter metrics in `registry` and run one scrape.
pub async fn export(
    registry: &Registry,
    fetcher: &dyn StatusFetcher,
) -> Result<Option<ParsedStatus>> {
    Exporter::register(registry.clone())?.export(fetcher).await
}
