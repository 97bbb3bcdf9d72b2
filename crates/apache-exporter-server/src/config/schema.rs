use serde::Deserialize;
use apache_exporter_core::error::{ExporterError, Result};
use apache_exporter_core::DEFAULT_STATUS_URL;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    pub version: u32,

    #[serde(default)]
    pub exporter: ExporterSection,

    #[serde(default)]
    pub storage: StorageSection,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            version: 1,
            exporter: ExporterSection::default(),
            storage: StorageSection::default(),
        }
    }
}

impl ExporterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ExporterError::Config(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.exporter.validate()?;
        self.storage.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_status_url")]
    pub status_url: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ExporterSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            status_url: default_status_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl ExporterSection {
    pub fn validate(&self) -> Result<()> {
        if self.listen.parse::<std::net::SocketAddr>().is_err() {
            return Err(ExporterError::Config(format!(
                "exporter.listen must be a socket address, got {:?}",
                self.listen
            )));
        }
        // plain HTTP only; the client is built without TLS support
        if !self.status_url.starts_with("http://") {
            return Err(ExporterError::Config(
                "exporter.status_url must be an http:// URL".into(),
            ));
        }
        if !(100..=60000).contains(&self.timeout_ms) {
            return Err(ExporterError::Config(
                "exporter.timeout_ms must be between 100 and 60000".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:9117".into()
}
fn default_status_url() -> String {
    DEFAULT_STATUS_URL.into()
}
fn default_timeout_ms() -> u64 {
    10000
}

/// Where scraped values live between `/metrics` requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageMode {
    /// Fresh in-memory registry per request; counters equal the current page.
    #[default]
    Ephemeral,
    /// One in-memory registry for the process lifetime.
    Memory,
    /// One registry persisted to `storage.path`.
    File,
}

impl StorageMode {
    pub fn as_str(self) -> &'static str {
        match self {
            StorageMode::Ephemeral => "ephemeral",
            StorageMode::Memory => "memory",
            StorageMode::File => "file",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageSection {
    #[serde(default)]
    pub mode: StorageMode,

    #[serde(default)]
    pub path: Option<String>,
}

impl StorageSection {
    pub fn validate(&self) -> Result<()> {
        match (self.mode, self.path.as_deref()) {
            (StorageMode::File, None) | (StorageMode::File, Some("")) => Err(
                ExporterError::Config("storage.path is required when storage.mode is file".into()),
            ),
            (StorageMode::File, Some(_)) => Ok(()),
            (mode, Some(_)) => Err(ExporterError::Config(format!(
                "storage.path is only valid with storage.mode file (mode is {})",
                mode.as_str()
            ))),
            (_, None) => Ok(()),
        }
    }
}
