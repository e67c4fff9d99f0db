use dh_core::StatusPayload;

/// One frame on a direct status stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFrame {
    Status(StatusPayload),
    Heartbeat,
}
