use dh_core::{StatusPayload, StatusState};

use serde::Serialize;

/// A status transition for one tab, as delivered to subscribers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabStatusUpdate {
    pub tab_index: usize,
    pub state: StatusState,
    pub message: Option<String>,
}

impl TabStatusUpdate {
    pub fn new(tab_index: usize, payload: &StatusPayload) -> Self {
        Self {
            tab_index,
            state: payload.state,
            message: payload.message.clone(),
        }
    }

    pub fn payload(&self) -> StatusPayload {
        StatusPayload {
            state: self.state,
            message: self.message.clone(),
        }
    }
}
