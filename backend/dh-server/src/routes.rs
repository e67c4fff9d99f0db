use crate::{AppState, api, health};

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};

/// Build the application router with all endpoints
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Dashboard API
        .route("/api/config", get(api::config::get_config))
        .route("/api/restart/{idx}", post(api::restart::restart_tab))
        .route("/api/status/{idx}", get(api::status::get_status))
        .route("/api/status/{idx}/stream", get(api::status::stream_status))
        // External gateway
        .route("/api/sse/callback", post(api::callback::gateway_callback))
        // Health check endpoints
        .route("/health", get(health::health))
        .route("/live", get(health::liveness))
        .route("/ready", get(health::readiness))
        .route("/metrics", get(health::metrics))
        .with_state(state)
        // Dashboard is served from another origin in development
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
