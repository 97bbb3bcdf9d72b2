//! Operational HTTP endpoints.
//!
//! - `/healthz` : liveness
//! - `/metrics` : scrape the status page, then Prometheus text format

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use apache_exporter_core::registry::TEXT_CONTENT_TYPE;

use crate::app_state::AppState;

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    match state.scrape_and_render().await {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(kind = e.kind().as_str(), error = %e, "metrics export failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("{}: {e}\n", e.kind().as_str()),
            )
                .into_response()
        }
    }
}
