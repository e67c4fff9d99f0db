use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum K8sError {
    #[error("Kubernetes API error: {} {location}", api_reason(.reason, .message))]
    Api {
        status: u16,
        reason: String,
        message: Option<String>,
        location: ErrorLocation,
    },

    #[error("HTTP request error: {message} {location}")]
    Http {
        message: String,
        location: ErrorLocation,
        #[source]
        source: reqwest::Error,
    },

    #[error("Watch decode error: {message} {location}")]
    Decode {
        message: String,
        location: ErrorLocation,
    },

    #[error("Kubernetes client configuration error: {message} {location}")]
    Config {
        message: String,
        location: ErrorLocation,
    },
}

fn api_reason(reason: &str, message: &Option<String>) -> String {
    match message {
        Some(message) if !message.is_empty() => format!("{reason}: {message}"),
        _ => reason.to_string(),
    }
}

impl K8sError {
    /// Human-readable cause, without the source location
    pub fn reason(&self) -> String {
        match self {
            Self::Api {
                reason, message, ..
            } => api_reason(reason, message),
            Self::Http { message, .. }
            | Self::Decode { message, .. }
            | Self::Config { message, .. } => message.clone(),
        }
    }

    /// HTTP status of an API rejection
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[track_caller]
    pub fn api(status: u16, reason: impl Into<String>, message: Option<String>) -> Self {
        Self::Api {
            status,
            reason: reason.into(),
            message,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        Self::Http {
            message: err.to_string(),
            location: ErrorLocation::from(Location::caller()),
            source: err,
        }
    }

    #[track_caller]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<reqwest::Error> for K8sError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        K8sError::from_reqwest(err)
    }
}

pub type Result<T> = std::result::Result<T, K8sError>;
