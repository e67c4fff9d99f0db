use crate::DeploymentKey;

/// A tab's position together with the deployment it restarts, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabBinding {
    pub index: usize,
    pub deployment_key: Option<DeploymentKey>,
}

impl TabBinding {
    pub fn is_restartable(&self) -> bool {
        self.deployment_key.is_some()
    }
}
