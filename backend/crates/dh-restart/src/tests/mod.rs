
use dh_core::DeploymentKey;
use dh_k8s::{
    Deployment, DeploymentApi, DeploymentCondition, DeploymentSpec, DeploymentStatus,
    DeploymentWatch, K8sError, ObjectMeta, Result as K8sErrorResult, WatchEvent,
};

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

/// What a fake watch does once its scripted events run out
#[derive(Clone, Copy)]
pub(crate) enum AfterScript {
    /// Stream ends (`Ok(None)`)
    End,
    /// Never yields again
    Hang,
    Panic,
}

pub(crate) struct FakeWatch {
    events: VecDeque<K8sErrorResult<WatchEvent>>,
    after: AfterScript,
    stops: Arc<AtomicUsize>,
}

#[async_trait]
impl DeploymentWatch for FakeWatch {
    async fn next_event(&mut self) -> K8sErrorResult<Option<WatchEvent>> {
        if let Some(event) = self.events.pop_front() {
            return event.map(Some);
        }
        match self.after {
            AfterScript::End => Ok(None),
            AfterScript::Hang => std::future::pending().await,
            AfterScript::Panic => panic!("watch blew up"),
        }
    }

    fn stop(&mut self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Scriptable orchestration API
pub(crate) struct FakeApi {
    pub generation: i64,
    pub patch_error: Mutex<Option<K8sError>>,
    pub read_error: Mutex<Option<K8sError>>,
    /// Events for the next watch; consumed when opened
    pub script: Mutex<Vec<K8sErrorResult<WatchEvent>>>,
    pub after: AfterScript,
    /// When set, patch waits for a notification
    pub patch_gate: Option<Arc<Notify>>,
    pub markers: Mutex<Vec<String>>,
    pub watches_opened: AtomicUsize,
    pub stops: Arc<AtomicUsize>,
}

impl FakeApi {
    pub fn new(generation: i64, events: Vec<WatchEvent>, after: AfterScript) -> Self {
        Self {
            generation,
            patch_error: Mutex::new(None),
            read_error: Mutex::new(None),
            script: Mutex::new(events.into_iter().map(Ok).collect()),
            after,
            patch_gate: None,
            markers: Mutex::new(Vec::new()),
            watches_opened: AtomicUsize::new(0),
            stops: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn watch_count(&self) -> usize {
        self.watches_opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeploymentApi for FakeApi {
    async fn patch_restart_marker(&self, _key: &DeploymentKey, marker: &str) -> K8sErrorResult<()> {
        if let Some(gate) = &self.patch_gate {
            gate.notified().await;
        }
        if let Some(err) = self.patch_error.lock().unwrap().take() {
            return Err(err);
        }
        self.markers.lock().unwrap().push(marker.to_string());
        Ok(())
    }

    async fn read_deployment(&self, _key: &DeploymentKey) -> K8sErrorResult<Deployment> {
        if let Some(err) = self.read_error.lock().unwrap().take() {
            return Err(err);
        }
        Ok(deployment(self.generation, Some(self.generation - 1), 1, 1))
    }

    async fn watch_deployment(
        &self,
        _key: &DeploymentKey,
        _timeout: Duration,
    ) -> K8sErrorResult<Box<dyn DeploymentWatch>> {
        self.watches_opened.fetch_add(1, Ordering::SeqCst);
        let events: VecDeque<_> = self.script.lock().unwrap().drain(..).collect();
        Ok(Box::new(FakeWatch {
            events,
            after: self.after,
            stops: Arc::clone(&self.stops),
        }))
    }
}

/// Deployment with `desired` replicas of which `ready` are ready, available and updated
pub(crate) fn deployment(generation: i64, observed: Option<i64>, desired: i32, ready: i32) -> Deployment {
    Deployment {
        metadata: ObjectMeta {
            name: Some("api".to_string()),
            namespace: Some("prod".to_string()),
            generation: Some(generation),
            resource_version: None,
        },
        spec: Some(DeploymentSpec {
            replicas: Some(desired),
        }),
        status: Some(DeploymentStatus {
            observed_generation: observed,
            replicas: Some(desired),
            ready_replicas: Some(ready),
            available_replicas: Some(ready),
            updated_replicas: Some(ready),
            conditions: Vec::new(),
        }),
    }
}

pub(crate) fn deadline_exceeded(generation: i64) -> Deployment {
    let mut stuck = deployment(generation, Some(generation), 1, 0);
    if let Some(status) = stuck.status.as_mut() {
        status.conditions.push(DeploymentCondition {
            type_: "Progressing".to_string(),
            status: "False".to_string(),
            reason: Some("ProgressDeadlineExceeded".to_string()),
            message: Some("ReplicaSet \"api-7d\" has timed out progressing.".to_string()),
            observed_generation: Some(generation),
        });
    }
    stuck
}
