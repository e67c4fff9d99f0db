//! Restart trigger handler

use crate::{AppState, api::error::ApiError, api::error::Result as ApiResult};

use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
};
use log::info;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct RestartResponse {
    pub status: &'static str,
}

/// POST /api/restart/{idx}
///
/// Accepts the restart and returns immediately; the outcome is only visible
/// on the tab's status stream.
pub async fn restart_tab(
    State(state): State<AppState>,
    index: Result<Path<usize>, PathRejection>,
) -> ApiResult<Json<RestartResponse>> {
    let Path(index) = index.map_err(|e| ApiError::not_found(format!("Unknown tab: {e}")))?;

    let binding = state.catalog.assert_restartable(index)?;
    state.orchestrator.request_restart(index, &binding)?;
    info!("Restart requested for tab {index}");

    Ok(Json(RestartResponse {
        status: "restarting",
    }))
}
