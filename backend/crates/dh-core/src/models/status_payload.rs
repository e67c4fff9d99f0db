use crate::StatusState;

use serde::{Deserialize, Serialize};

/// Last known state of a tab, replayed to every new subscriber
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StatusPayload {
    pub state: StatusState,
    /// Diagnostic text, only set for [`StatusState::Error`]
    pub message: Option<String>,
}

impl StatusPayload {
    pub fn running() -> Self {
        Self {
            state: StatusState::Running,
            message: None,
        }
    }

    pub fn restarting() -> Self {
        Self {
            state: StatusState::Restarting,
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            state: StatusState::Error,
            message: Some(message.into()),
        }
    }
}
