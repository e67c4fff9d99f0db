use crate::Result as SseErrorResult;

use serde::Serialize;

/// A named SSE event with a pre-serialized JSON `data` field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEvent {
    pub name: String,
    pub data: String,
}

impl OutboundEvent {
    #[track_caller]
    pub fn json<T: Serialize>(name: impl Into<String>, data: &T) -> SseErrorResult<Self> {
        Ok(Self {
            name: name.into(),
            data: serde_json::to_string(data)?,
        })
    }
}
