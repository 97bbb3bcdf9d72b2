//! apache-exporter core: status page parsing, metric registry, and the
//! scrape pipeline.
//!
//! This crate turns an Apache `mod_status` page (`server-status?auto`) into
//! counters and gauges. It carries no HTTP server or config so it can be
//! driven by any fetcher and any storage backend.
//!
//! # Panic policy
//! Panics, `unwrap`, and `expect` are compile-denied here. All fallible
//! paths surface as `ExporterError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod exporter;
pub mod registry;
pub mod status;
pub mod updater;

/// Shared result type.
pub use error::{ExporterError, FailureKind, Result};
pub use exporter::{export, Exporter, StatusFetcher, DEFAULT_STATUS_URL};
pub use registry::{FileStorage, InMemoryStorage, MetricStorage, Registry};
pub use status::{parse_status, ParsedStatus};
pub use updater::update_registry;
