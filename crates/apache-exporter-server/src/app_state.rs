//! Shared application state for the exporter server.
//!
//! Built once at startup; handlers clone it cheaply. Startup errors
//! (bad storage path, conflicting stored metrics, client init) are returned
//! instead of panicking.

use std::sync::Arc;
use std::time::Duration;

use apache_exporter_core::error::Result;
use apache_exporter_core::registry::{FileStorage, Registry};
use apache_exporter_core::{Exporter, StatusFetcher};

use crate::config::{ExporterConfig, StorageMode};
use crate::fetcher::HttpStatusFetcher;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    fetcher: Arc<dyn StatusFetcher>,
    // None => fresh registry per scrape
    shared: Option<Exporter>,
}

impl AppState {
    /// Build state with the HTTP fetcher described by `cfg`.
    pub fn new(cfg: ExporterConfig) -> Result<Self> {
        let fetcher = HttpStatusFetcher::new(
            cfg.exporter.status_url.clone(),
            Duration::from_millis(cfg.exporter.timeout_ms),
        )?;
        Self::with_fetcher(cfg, Arc::new(fetcher))
    }

    /// Build state around any fetcher (tests, embedding).
    ///
    /// Long-lived registries get their metrics registered here, so a store
    /// holding conflicting families is rejected before serving.
    pub fn with_fetcher(cfg: ExporterConfig, fetcher: Arc<dyn StatusFetcher>) -> Result<Self> {
        let shared = match cfg.storage.mode {
            StorageMode::Ephemeral => None,
            StorageMode::Memory => Some(Exporter::register(Registry::in_memory())?),
            StorageMode::File => {
                // validate() guarantees the path for file mode
                let path = cfg.storage.path.unwrap_or_default();
                let registry = Registry::new(Arc::new(FileStorage::open(path)?));
                Some(Exporter::register(registry)?)
            }
        };

        Ok(Self {
            inner: Arc::new(AppStateInner { fetcher, shared }),
        })
    }

    /// Scrape once and render the resulting registry.
    pub async fn scrape_and_render(&self) -> Result<String> {
        let fetcher = self.inner.fetcher.as_ref();
        match &self.inner.shared {
            Some(exporter) => render_scrape(exporter, fetcher).await,
            None => render_scrape(&Exporter::register(Registry::in_memory())?, fetcher).await,
        }
    }
}

async fn render_scrape(exporter: &Exporter, fetcher: &dyn StatusFetcher) -> Result<String> {
    exporter.export(fetcher).await?;
    exporter.registry().render()
}
