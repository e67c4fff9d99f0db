use chrono::{DateTime, Utc};

/// Snapshot of one gateway connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub request_id: String,
    pub subject: Option<String>,
    pub url: String,
    pub connected_at: DateTime<Utc>,
}
