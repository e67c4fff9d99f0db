use std::result::Result as StdResult;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Validation error: {message} {location}")]
    Validation {
        message: String,
        location: ErrorLocation,
    },

    #[error("tab index {index} is out of range {location}")]
    TabNotFound {
        index: usize,
        location: ErrorLocation,
    },

    #[error("tab index {index} is not restartable {location}")]
    TabNotRestartable {
        index: usize,
        location: ErrorLocation,
    },

    #[error("Invalid status state: {value} {location}")]
    InvalidStatusState {
        value: String,
        location: ErrorLocation,
    },
}

pub type Result<T> = StdResult<T, CoreError>;
