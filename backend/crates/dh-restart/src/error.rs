use std::panic::Location;
use std::time::Duration;

use dh_core::DeploymentKey;
use dh_k8s::K8sError;
use dh_sse::SseError;
use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RestartError {
    #[error("restart already in progress for {key} {location}")]
    InProgress {
        key: DeploymentKey,
        location: ErrorLocation,
    },

    #[error("tab index {index} is not restartable {location}")]
    NotRestartable {
        index: usize,
        location: ErrorLocation,
    },

    #[error("restart of {key} did not finish within {} {location}", format_timeout(.timeout))]
    Timeout {
        key: DeploymentKey,
        timeout: Duration,
        location: ErrorLocation,
    },

    #[error("restart of {key} failed: {reason} {location}")]
    Failed {
        key: DeploymentKey,
        reason: String,
        location: ErrorLocation,
    },

    #[error("Status store error: {source} {location}")]
    Status {
        #[source]
        source: SseError,
        location: ErrorLocation,
    },
}

impl RestartError {
    #[track_caller]
    pub fn in_progress(key: &DeploymentKey) -> Self {
        Self::InProgress {
            key: key.clone(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn not_restartable(index: usize) -> Self {
        Self::NotRestartable {
            index,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn timeout(key: &DeploymentKey, timeout: Duration) -> Self {
        Self::Timeout {
            key: key.clone(),
            timeout,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn failed(key: &DeploymentKey, reason: impl Into<String>) -> Self {
        Self::Failed {
            key: key.clone(),
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Orchestration API error during trigger, read or watch
    #[track_caller]
    pub fn api(key: &DeploymentKey, err: &K8sError) -> Self {
        Self::failed(key, format!("Kubernetes API error: {}", err.reason()))
    }

    /// Text shown to users in the tab's `error` status
    pub fn status_message(&self) -> String {
        match self {
            Self::InProgress { key, .. } => {
                format!("restart already in progress ({})", key_context(key))
            }
            Self::NotRestartable { index, .. } => format!("tab {index} is not restartable"),
            Self::Timeout { key, timeout, .. } => format!(
                "restart did not finish within {} ({})",
                format_timeout(timeout),
                key_context(key)
            ),
            Self::Failed { key, reason, .. } => {
                format!("restart failed: {reason} ({})", key_context(key))
            }
            Self::Status { source, .. } => format!("restart failed: {source}"),
        }
    }

    /// Label for outcome metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InProgress { .. } => "in_progress",
            Self::NotRestartable { .. } => "not_restartable",
            Self::Timeout { .. } => "timeout",
            Self::Failed { .. } => "failed",
            Self::Status { .. } => "status",
        }
    }
}

impl From<SseError> for RestartError {
    #[track_caller]
    fn from(source: SseError) -> Self {
        Self::Status {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

fn key_context(key: &DeploymentKey) -> String {
    format!("namespace={}, deployment={}", key.namespace, key.deployment)
}

fn format_timeout(timeout: &Duration) -> String {
    if timeout.subsec_millis() == 0 {
        match timeout.as_secs() {
            1 => "1 second".to_string(),
            secs => format!("{secs} seconds"),
        }
    } else {
        format!("{:.1} seconds", timeout.as_secs_f64())
    }
}

pub type Result<T> = std::result::Result<T, RestartError>;
