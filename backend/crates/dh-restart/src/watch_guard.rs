use dh_k8s::{DeploymentWatch, Result as K8sErrorResult, WatchEvent};

use log::debug;

/// Owns an open watch and stops it exactly once.
///
/// Stops on [`WatchGuard::stop`] or on drop, whichever comes first, so every
/// exit path of the owner (including cancellation and panics) releases it.
pub struct WatchGuard {
    watch: Option<Box<dyn DeploymentWatch>>,
}

impl WatchGuard {
    pub fn new(watch: Box<dyn DeploymentWatch>) -> Self {
        Self { watch: Some(watch) }
    }

    /// `Ok(None)` once the server ends the stream or the guard is stopped.
    pub async fn next_event(&mut self) -> K8sErrorResult<Option<WatchEvent>> {
        match self.watch.as_mut() {
            Some(watch) => watch.next_event().await,
            None => Ok(None),
        }
    }

    pub fn stop(&mut self) {
        if let Some(mut watch) = self.watch.take() {
            watch.stop();
            debug!("Rollout watch stopped");
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.watch.is_none()
    }
}

impl Drop for WatchGuard {
    fn drop(&mut self) {
        self.stop();
    }
}
