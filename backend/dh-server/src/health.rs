use crate::AppState;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// GET /health - Component status and live counters
pub async fn health(State(state): State<AppState>) -> Response {
    let shutting_down = state.shutdown.is_shutdown();

    let health = json!({
        "status": if shutting_down { "shutting_down" } else { "healthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "transport": state.settings.transport.as_str(),
        "components": {
            "status_store": "operational",
            "gateway": if state.registry.is_some() { "operational" } else { "disabled" },
            "auth": if state.settings.auth_enabled { "enabled" } else { "disabled" },
        },
        "tabs": state.catalog.len(),
        "active_connections": state.registry.as_ref().map_or(0, |r| r.total_count()),
        "stream_subscribers": state.store.subscriber_count(),
        "in_flight_restarts": state.orchestrator.in_flight_count(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (StatusCode::OK, Json(health)).into_response()
}

/// GET /live - Kubernetes liveness probe (is the process alive?)
pub async fn liveness() -> Response {
    (StatusCode::OK, "OK").into_response()
}

/// GET /ready - Kubernetes readiness probe; fails once shutdown starts
pub async fn readiness(State(state): State<AppState>) -> Response {
    if state.shutdown.is_shutdown() {
        return (StatusCode::SERVICE_UNAVAILABLE, "Shutting down").into_response();
    }
    (StatusCode::OK, "Ready").into_response()
}

/// GET /metrics - Prometheus exposition
pub async fn metrics(State(state): State<AppState>) -> Response {
    match state.metrics {
        Some(ref handle) => (StatusCode::OK, handle.render()).into_response(),
        None => (StatusCode::NOT_FOUND, "Metrics exporter not installed").into_response(),
    }
}
