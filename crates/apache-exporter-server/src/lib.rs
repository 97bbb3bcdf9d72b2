//! apache-exporter server library entry.
//!
//! Wires configuration, the HTTP status fetcher, and the core scrape pipeline
//! into an axum service. Consumed by the binary (`main.rs`) and by
//! integration tests.

pub mod app_state;
pub mod config;
pub mod fetcher;
pub mod ops;
pub mod router;
