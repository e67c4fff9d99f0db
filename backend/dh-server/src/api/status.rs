//! Tab status handlers

use crate::{AppState, api::error::ApiError, api::error::Result as ApiResult};

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
    http::{HeaderName, header},
    response::{
        IntoResponse,
        sse::{Event, Sse},
    },
};
use dh_core::StatusPayload;
use dh_sse::StreamFrame;
use futures::StreamExt;

/// Client reconnect delay advertised on every frame
pub const RETRY_INTERVAL: Duration = Duration::from_millis(3000);

pub const STATUS_EVENT: &str = "status";
pub const HEARTBEAT_EVENT: &str = "heartbeat";

const X_ACCEL_BUFFERING: HeaderName = HeaderName::from_static("x-accel-buffering");

fn tab_index(index: Result<Path<usize>, PathRejection>) -> ApiResult<usize> {
    index
        .map(|Path(index)| index)
        .map_err(|e| ApiError::not_found(format!("Unknown tab: {e}")))
}

/// GET /api/status/{idx}
pub async fn get_status(
    State(state): State<AppState>,
    index: Result<Path<usize>, PathRejection>,
) -> ApiResult<Json<StatusPayload>> {
    let index = tab_index(index)?;
    Ok(Json(state.store.current(index)?))
}

/// Render one stream frame as an SSE event
pub fn frame_to_event(frame: StreamFrame) -> Event {
    let event = match frame {
        StreamFrame::Status(payload) => match serde_json::to_string(&payload) {
            Ok(data) => Event::default().event(STATUS_EVENT).data(data),
            Err(e) => {
                log::error!("Failed to encode status frame: {e}");
                Event::default().event(HEARTBEAT_EVENT).data("{}")
            }
        },
        StreamFrame::Heartbeat => Event::default().event(HEARTBEAT_EVENT).data("{}"),
    };
    event.retry(RETRY_INTERVAL)
}

/// GET /api/status/{idx}/stream
///
/// Sends the current status first, then every transition, with heartbeats
/// while idle. Ends on server shutdown.
pub async fn stream_status(
    State(state): State<AppState>,
    index: Result<Path<usize>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let index = tab_index(index)?;
    let subscription = state.store.subscribe(index)?;

    let frames = subscription
        .into_stream(
            state.settings.heartbeat_interval,
            state.shutdown.subscribe_guard(),
        )
        .map(|frame| Ok::<Event, Infallible>(frame_to_event(frame)));

    Ok((
        [
            (header::CACHE_CONTROL, "no-cache"),
            (X_ACCEL_BUFFERING, "no"),
        ],
        Sse::new(frames),
    ))
}
