//! Shared error type across apache-exporter crates.

use thiserror::Error;

/// Stable failure classification (used as a log field and in HTTP responses).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Status page could not be loaded.
    Fetch,
    /// A required status field is absent.
    MissingField,
    /// A required status field is not an unsigned integer.
    InvalidValue,
    /// Conflicting or malformed metric definition.
    Registration,
    /// Backing store could not be read or written.
    Storage,
    /// Invalid configuration.
    Config,
    /// Anything else (I/O at startup, server errors).
    Internal,
}

impl FailureKind {
    /// String representation used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Fetch => "FETCH",
            FailureKind::MissingField => "MISSING_FIELD",
            FailureKind::InvalidValue => "INVALID_VALUE",
            FailureKind::Registration => "REGISTRATION",
            FailureKind::Storage => "STORAGE",
            FailureKind::Config => "CONFIG",
            FailureKind::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ExporterError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("{0}")]
    Fetch(String),
    #[error("missing status field: {0}")]
    MissingField(String),
    #[error("invalid value for status field {field}: {value:?}")]
    InvalidValue { field: String, value: String },
    #[error("metric registration failed: {0}")]
    Registration(String),
    #[error("metric storage: {0}")]
    Storage(String),
    #[error("config: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl ExporterError {
    /// Map the error to its stable classification.
    pub fn kind(&self) -> FailureKind {
        match self {
            ExporterError::Fetch(_) => FailureKind::Fetch,
            ExporterError::MissingField(_) => FailureKind::MissingField,
            ExporterError::InvalidValue { .. } => FailureKind::InvalidValue,
            ExporterError::Registration(_) => FailureKind::Registration,
            ExporterError::Storage(_) => FailureKind::Storage,
            ExporterError::Config(_) => FailureKind::Config,
            ExporterError::Internal(_) => FailureKind::Internal,
        }
    }

    /// Whether this error is an ordinary scrape failure.
    ///
    /// Scrape failures are counted in `apache_exporter_scrape_failures_total`
    /// and swallowed by the exporter. Everything else is a setup defect and is
    /// returned to the caller.
    pub fn is_scrape_failure(&self) -> bool {
        matches!(
            self.kind(),
            FailureKind::Fetch | FailureKind::MissingField | FailureKind::InvalidValue
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_scrape_failures() {
        assert!(ExporterError::Fetch("down".into()).is_scrape_failure());
        assert!(ExporterError::MissingField("Uptime".into()).is_scrape_failure());
        assert!(ExporterError::InvalidValue {
            field: "Uptime".into(),
            value: "x".into()
        }
        .is_scrape_failure());
        assert!(!ExporterError::Registration("dup".into()).is_scrape_failure());
        assert!(!ExporterError::Storage("io".into()).is_scrape_failure());
    }

    #[test]
    fn missing_field_message_names_field() {
        let e = ExporterError::MissingField("Total Accesses".into());
        assert_eq!(e.to_string(), "missing status field: Total Accesses");
        assert_eq!(e.kind().as_str(), "MISSING_FIELD");
    }
}
