//! apache-exporter server
//!
//! - `/metrics`: scrape `mod_status` and render Prometheus text
//! - `/healthz`: liveness
//!
//! Config path: first argument, else `$APACHE_EXPORTER_CONFIG`, else
//! `apache-exporter.yaml` (defaults when absent).

use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};

use apache_exporter_core::error::{ExporterError, Result};
use apache_exporter_server::{app_state, config, router};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    if let Err(e) = run().await {
        tracing::error!(kind = e.kind().as_str(), error = %e, "apache-exporter-server failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cfg = config::load(std::env::args().nth(1))?;
    let listen: SocketAddr = cfg
        .exporter
        .listen
        .parse()
        .map_err(|e| ExporterError::Config(format!("exporter.listen: {e}")))?;

    tracing::info!(
        %listen,
        status_url = %cfg.exporter.status_url,
        storage = cfg.storage.mode.as_str(),
        "apache-exporter-server starting"
    );

    let state = app_state::AppState::new(cfg)?;
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| ExporterError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| ExporterError::Internal(format!("server failed: {e}")))
}
