use serde::{Deserialize, Serialize};

/// Identifies one deployment under the orchestration API.
///
/// Used as the mutual-exclusion key for restarts, so equality and hashing are
/// by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeploymentKey {
    pub namespace: String,
    pub deployment: String,
}

impl DeploymentKey {
    pub fn new(namespace: impl Into<String>, deployment: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            deployment: deployment.into(),
        }
    }
}

impl std::fmt::Display for DeploymentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.deployment)
    }
}
