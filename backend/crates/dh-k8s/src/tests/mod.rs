
use crate::{Deployment, DeploymentCondition, DeploymentSpec, DeploymentStatus, ObjectMeta};

/// Deployment at `generation` whose controller has observed `observed`
pub(crate) fn deployment(generation: i64, observed: Option<i64>, desired: Option<i32>) -> Deployment {
    Deployment {
        metadata: ObjectMeta {
            name: Some("api".to_string()),
            namespace: Some("default".to_string()),
            generation: Some(generation),
            resource_version: None,
        },
        spec: Some(DeploymentSpec { replicas: desired }),
        status: Some(DeploymentStatus {
            observed_generation: observed,
            ..DeploymentStatus::default()
        }),
    }
}

pub(crate) fn with_counts(
    mut deployment: Deployment,
    ready: Option<i32>,
    available: Option<i32>,
    updated: Option<i32>,
) -> Deployment {
    if let Some(status) = deployment.status.as_mut() {
        status.ready_replicas = ready;
        status.available_replicas = available;
        status.updated_replicas = updated;
    }
    deployment
}

pub(crate) fn condition(
    type_: &str,
    status: &str,
    reason: Option<&str>,
    message: Option<&str>,
    observed_generation: Option<i64>,
) -> DeploymentCondition {
    DeploymentCondition {
        type_: type_.to_string(),
        status: status.to_string(),
        reason: reason.map(String::from),
        message: message.map(String::from),
        observed_generation,
    }
}

pub(crate) fn with_condition(mut deployment: Deployment, condition: DeploymentCondition) -> Deployment {
    if let Some(status) = deployment.status.as_mut() {
        status.conditions.push(condition);
    }
    deployment
}
