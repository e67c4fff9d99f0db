//! Generation-scoped rollout checks.
//!
//! Both checks take the target generation captured right after the restart
//! patch; anything the controller reports for an older generation belongs to a
//! previous rollout and is ignored.

use crate::{Deployment, DeploymentCondition};

pub const CONDITION_PROGRESSING: &str = "Progressing";
pub const CONDITION_AVAILABLE: &str = "Available";
pub const REASON_PROGRESS_DEADLINE_EXCEEDED: &str = "ProgressDeadlineExceeded";

const ROLLOUT_HALTED: &str = "rollout halted";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RolloutVerdict {
    /// Keep watching
    Pending,
    Ready,
    Failed(String),
}

/// Failure wins over readiness for the same object.
pub fn evaluate_rollout(deployment: &Deployment, target_generation: i64) -> RolloutVerdict {
    if let Some(reason) = rollout_failure(deployment, target_generation) {
        return RolloutVerdict::Failed(reason);
    }
    if is_rollout_ready(deployment, target_generation) {
        return RolloutVerdict::Ready;
    }
    RolloutVerdict::Pending
}

/// A condition without its own generation is taken at face value.
fn is_authoritative(condition: &DeploymentCondition, target_generation: i64) -> bool {
    condition
        .observed_generation
        .is_none_or(|generation| generation >= target_generation)
}

/// Reason text when a `Progressing` condition reports `False` for this rollout
pub fn rollout_failure(deployment: &Deployment, target_generation: i64) -> Option<String> {
    let status = deployment.status.as_ref()?;

    status
        .conditions
        .iter()
        .filter(|c| c.type_ == CONDITION_PROGRESSING)
        .filter(|c| is_authoritative(c, target_generation))
        .find(|c| c.is_false())
        .map(describe_failure)
}

fn describe_failure(condition: &DeploymentCondition) -> String {
    let reason = condition.reason.as_deref().filter(|r| !r.is_empty());
    let detail = condition
        .message
        .as_deref()
        .filter(|m| !m.is_empty())
        .or(reason)
        .unwrap_or(ROLLOUT_HALTED);

    if reason == Some(REASON_PROGRESS_DEADLINE_EXCEEDED) {
        if detail == REASON_PROGRESS_DEADLINE_EXCEEDED {
            return format!("progress deadline exceeded ({REASON_PROGRESS_DEADLINE_EXCEEDED})");
        }
        return format!("progress deadline exceeded ({REASON_PROGRESS_DEADLINE_EXCEEDED}): {detail}");
    }

    detail.to_string()
}

pub fn is_rollout_ready(deployment: &Deployment, target_generation: i64) -> bool {
    let Some(status) = deployment.status.as_ref() else {
        return false;
    };

    let available_confirmed = status.conditions.iter().any(|c| {
        c.type_ == CONDITION_AVAILABLE
            && c.is_true()
            && c
                .observed_generation
                .is_some_and(|generation| generation >= target_generation)
    });
    if available_confirmed {
        return true;
    }

    if status
        .observed_generation
        .is_none_or(|generation| generation < target_generation)
    {
        return false;
    }

    let counts = [
        status.ready_replicas,
        status.available_replicas,
        status.updated_replicas,
    ];

    match deployment.desired_replicas() {
        Some(desired) => {
            if desired > 0 && counts.iter().any(Option::is_none) {
                return false;
            }
            counts.iter().flatten().all(|count| *count >= desired)
        }
        // No replica target to compare against.
        None => [status.ready_replicas, status.available_replicas]
            .iter()
            .flatten()
            .any(|count| *count > 0),
    }
}
