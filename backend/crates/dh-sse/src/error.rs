use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SseError {
    #[error("tab index {index} is out of range (tabs: {tab_count}) {location}")]
    TabNotFound {
        index: usize,
        tab_count: usize,
        location: ErrorLocation,
    },

    #[error("Gateway HTTP error: {message} {location}")]
    Http {
        message: String,
        location: ErrorLocation,
        #[source]
        source: reqwest::Error,
    },

    #[error("Event serialization failed: {source} {location}")]
    Serialize {
        #[source]
        source: serde_json::Error,
        location: ErrorLocation,
    },
}

impl SseError {
    #[track_caller]
    pub fn tab_not_found(index: usize, tab_count: usize) -> Self {
        Self::TabNotFound {
            index,
            tab_count,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<reqwest::Error> for SseError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        Self::Http {
            message: err.to_string(),
            location: ErrorLocation::from(Location::caller()),
            source: err,
        }
    }
}

impl From<serde_json::Error> for SseError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::Serialize {
            source: err,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, SseError>;
