pub mod deployment_api;
pub mod error;
pub mod kube_client;
pub mod models;
pub mod rollout;
pub mod watch_decoder;

pub use deployment_api::{DeploymentApi, DeploymentWatch};
pub use error::{K8sError, Result};
pub use kube_client::{HttpDeploymentWatch, KubeClient};
pub use models::api_status::ApiStatus;
pub use models::deployment::{
    Deployment, DeploymentCondition, DeploymentSpec, DeploymentStatus, ObjectMeta,
};
pub use models::watch_event::WatchEvent;
pub use rollout::{RolloutVerdict, evaluate_rollout, is_rollout_ready, rollout_failure};
pub use watch_decoder::WatchDecoder;

/// Pod template annotation bumped to trigger a rollout
pub const RESTARTED_AT_ANNOTATION: &str = "kubectl.kubernetes.io/restartedAt";

#[cfg(test)]
mod tests;
