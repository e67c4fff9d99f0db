use crate::{ApiStatus, Deployment};

use serde::Deserialize;

/// One line of a `?watch=true` response
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", content = "object")]
pub enum WatchEvent {
    #[serde(rename = "ADDED")]
    Added(Deployment),
    #[serde(rename = "MODIFIED")]
    Modified(Deployment),
    #[serde(rename = "DELETED")]
    Deleted(Deployment),
    #[serde(rename = "BOOKMARK")]
    Bookmark(serde_json::Value),
    #[serde(rename = "ERROR")]
    Error(ApiStatus),
}

impl WatchEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Added(_) => "ADDED",
            Self::Modified(_) => "MODIFIED",
            Self::Deleted(_) => "DELETED",
            Self::Bookmark(_) => "BOOKMARK",
            Self::Error(_) => "ERROR",
        }
    }
}
