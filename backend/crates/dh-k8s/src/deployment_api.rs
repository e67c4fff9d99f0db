use crate::{Deployment, Result as K8sErrorResult, WatchEvent};

use std::time::Duration;

use async_trait::async_trait;
use dh_core::DeploymentKey;

/// The three orchestration API calls a restart needs
#[async_trait]
pub trait DeploymentApi: Send + Sync {
    /// Bump the pod template restart annotation to `marker`.
    async fn patch_restart_marker(&self, key: &DeploymentKey, marker: &str)
    -> K8sErrorResult<()>;

    async fn read_deployment(&self, key: &DeploymentKey) -> K8sErrorResult<Deployment>;

    /// Open a watch scoped to this one deployment. The server closes it after
    /// `timeout`.
    async fn watch_deployment(
        &self,
        key: &DeploymentKey,
        timeout: Duration,
    ) -> K8sErrorResult<Box<dyn DeploymentWatch>>;
}

/// An open watch. `stop` releases the underlying connection and must be
/// called exactly once by the owner.
#[async_trait]
pub trait DeploymentWatch: Send {
    /// `Ok(None)` once the server ends the stream.
    async fn next_event(&mut self) -> K8sErrorResult<Option<WatchEvent>>;

    fn stop(&mut self);
}
