//! REST API error types
//!
//! Every error renders as `{"error":{"code","message"}}` with a matching
//! status code. Messages never carry source locations.

use std::panic::Location;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dh_core::CoreError;
use dh_restart::RestartError;
use dh_sse::SseError;
use error_location::ErrorLocation;
use serde::Serialize;
use thiserror::Error;

/// JSON error response body
#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    /// Machine-readable error code (e.g., "NOT_FOUND", "RESTART_IN_PROGRESS")
    pub code: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Unknown tab or disabled endpoint (404)
    #[error("Resource not found: {message} {location}")]
    NotFound {
        message: String,
        location: ErrorLocation,
    },

    /// Tab has no deployment (400)
    #[error("Not restartable: {message} {location}")]
    NotRestartable {
        message: String,
        location: ErrorLocation,
    },

    /// Restart already running for this deployment (409)
    #[error("Conflict: {message} {location}")]
    RestartInProgress {
        message: String,
        location: ErrorLocation,
    },

    /// Gateway callback failed authentication (401)
    #[error("Unauthorized: {message} {location}")]
    Unauthorized {
        message: String,
        location: ErrorLocation,
    },

    #[error("Bad request: {message} {location}")]
    BadRequest {
        message: String,
        location: ErrorLocation,
    },

    #[error("Internal error: {message} {location}")]
    Internal {
        message: String,
        location: ErrorLocation,
    },
}

impl ApiError {
    #[track_caller]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Internal { .. } => log::error!("{}", self),
            _ => log::warn!("{}", self),
        }

        let (status, code, message) = match self {
            ApiError::NotFound { message, .. } => (StatusCode::NOT_FOUND, "NOT_FOUND", message),
            ApiError::NotRestartable { message, .. } => {
                (StatusCode::BAD_REQUEST, "NOT_RESTARTABLE", message)
            }
            ApiError::RestartInProgress { message, .. } => {
                (StatusCode::CONFLICT, "RESTART_IN_PROGRESS", message)
            }
            ApiError::Unauthorized { message, .. } => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
            }
            ApiError::BadRequest { message, .. } => (StatusCode::BAD_REQUEST, "BAD_REQUEST", message),
            ApiError::Internal { message, .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
            }
        };

        let body = ApiErrorResponse {
            error: ApiErrorBody {
                code: code.into(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    #[track_caller]
    fn from(e: CoreError) -> Self {
        let location = ErrorLocation::from(Location::caller());
        match e {
            CoreError::TabNotFound { index, .. } => ApiError::NotFound {
                message: format!("Tab {index} not found"),
                location,
            },
            CoreError::TabNotRestartable { index, .. } => ApiError::NotRestartable {
                message: format!("Tab {index} has no deployment to restart"),
                location,
            },
            other => ApiError::Internal {
                message: other.to_string(),
                location,
            },
        }
    }
}

impl From<SseError> for ApiError {
    #[track_caller]
    fn from(e: SseError) -> Self {
        let location = ErrorLocation::from(Location::caller());
        match e {
            SseError::TabNotFound { index, .. } => ApiError::NotFound {
                message: format!("Tab {index} not found"),
                location,
            },
            other => {
                log::error!("Status delivery error: {other}");
                ApiError::Internal {
                    message: "Status delivery failed".to_string(),
                    location,
                }
            }
        }
    }
}

impl From<RestartError> for ApiError {
    #[track_caller]
    fn from(e: RestartError) -> Self {
        let location = ErrorLocation::from(Location::caller());
        match e {
            RestartError::InProgress { ref key, .. } => ApiError::RestartInProgress {
                message: format!("A restart of {key} is already in progress"),
                location,
            },
            RestartError::NotRestartable { index, .. } => ApiError::NotRestartable {
                message: format!("Tab {index} has no deployment to restart"),
                location,
            },
            RestartError::Status {
                source: SseError::TabNotFound { index, .. },
                ..
            } => ApiError::NotFound {
                message: format!("Tab {index} not found"),
                location,
            },
            other => ApiError::Internal {
                message: other.status_message(),
                location,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
