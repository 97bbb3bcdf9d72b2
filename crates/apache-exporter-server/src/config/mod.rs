//! Exporter config loader (strict parsing).

pub mod schema;

use std::fs;
use std::io::ErrorKind;

use apache_exporter_core::error::{ExporterError, Result};

pub use schema::{ExporterConfig, ExporterSection, StorageMode, StorageSection};

/// Config file used when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "apache-exporter.yaml";

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "APACHE_EXPORTER_CONFIG";

pub fn load_from_file(path: &str) -> Result<ExporterConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| ExporterError::Config(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ExporterConfig> {
    let cfg: ExporterConfig = serde_yaml::from_str(s)
        .map_err(|e| ExporterError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load the config named on the command line or in the environment.
///
/// Without either, `apache-exporter.yaml` is used if present and built-in
/// defaults otherwise. An explicitly named file must exist.
pub fn load(explicit: Option<String>) -> Result<ExporterConfig> {
    if let Some(path) = explicit.or_else(|| std::env::var(CONFIG_PATH_ENV).ok()) {
        return load_from_file(&path);
    }
    match fs::metadata(DEFAULT_CONFIG_PATH) {
        Ok(_) => load_from_file(DEFAULT_CONFIG_PATH),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(path = DEFAULT_CONFIG_PATH, "no config file, using defaults");
            Ok(ExporterConfig::default())
        }
        Err(e) => Err(ExporterError::Config(format!(
            "stat {DEFAULT_CONFIG_PATH} failed: {e}"
        ))),
    }
}
