//! Fixture loader and fake fetchers shared by pipeline tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::fs;

use async_trait::async_trait;

use apache_exporter_core::error::{ExporterError, Result};
use apache_exporter_core::StatusFetcher;

pub fn fixture(name: &str) -> String {
    fs::read_to_string(format!("tests/fixtures/{name}")).unwrap()
}

/// Always returns the same page.
pub struct StaticFetcher {
    pub body: String,
}

impl StaticFetcher {
    pub fn from_fixture(name: &str) -> Self {
        Self { body: fixture(name) }
    }
}

#[async_trait]
impl StatusFetcher for StaticFetcher {
    fn target(&self) -> &str {
        "http://localhost/server-status?auto"
    }

    async fn fetch(&self) -> Result<String> {
        Ok(self.body.clone())
    }
}

/// Always fails like an unreachable server.
pub struct FailingFetcher;

#[async_trait]
impl StatusFetcher for FailingFetcher {
    fn target(&self) -> &str {
        "http://fail"
    }

    async fn fetch(&self) -> Result<String> {
        Err(ExporterError::Fetch("failed to load status from http://fail".into()))
    }
}
