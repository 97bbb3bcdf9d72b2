//! `HttpStatusFetcher` against a local axum server.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::{http::StatusCode, routing::get, Router};

use apache_exporter_core::registry::Registry;
use apache_exporter_core::{export, StatusFetcher};
use apache_exporter_server::fetcher::HttpStatusFetcher;

const PAGE: &str = "Total Accesses: 7\nTotal kBytes: 3\nUptime: 60\nBusyWorkers: 2\nIdleWorkers: 3\nScoreboard: KW___\n";

async fn spawn_status_server() -> SocketAddr {
    let app = Router::new()
        .route("/server-status", get(|| async { PAGE }))
        .route("/empty", get(|| async { "" }))
        .route("/broken", get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn fetcher(addr: SocketAddr, path: &str) -> HttpStatusFetcher {
    HttpStatusFetcher::new(format!("http://{addr}{path}"), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn downloads_status_page() {
    let addr = spawn_status_server().await;
    let body = fetcher(addr, "/server-status?auto").fetch().await.unwrap();
    assert_eq!(body, PAGE);
}

#[tokio::test]
async fn empty_body_is_a_fetch_failure() {
    let addr = spawn_status_server().await;
    let err = fetcher(addr, "/empty").fetch().await.unwrap_err();
    assert_eq!(err.kind().as_str(), "FETCH");
    assert!(err.to_string().contains("failed to load status from"));
}

#[tokio::test]
async fn error_status_is_a_fetch_failure() {
    let addr = spawn_status_server().await;
    let err = fetcher(addr, "/broken").fetch().await.unwrap_err();
    assert!(err.is_scrape_failure());
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn unreachable_server_is_a_fetch_failure() {
    // bind then drop to get a port nobody listens on
    let addr = {
        let l = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        l.local_addr().unwrap()
    };
    let err = fetcher(addr, "/server-status?auto").fetch().await.unwrap_err();
    assert_eq!(err.kind().as_str(), "FETCH");
}

#[tokio::test]
async fn exports_through_http() {
    let addr = spawn_status_server().await;
    let registry = Registry::in_memory();
    let parsed = export(&registry, &fetcher(addr, "/server-status?auto"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(parsed.get("Scoreboard"), Some("KW___"));

    let out = registry.render().unwrap();
    assert!(out.contains("\napache_accesses_total 7\n"));
    assert!(out.contains("apache_scoreboard{status=\"keepalive\"} 1\n"));
    assert!(out.contains("apache_scoreboard{status=\"idle\"} 3\n"));
}
