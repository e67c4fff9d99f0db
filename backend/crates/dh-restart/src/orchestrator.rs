use crate::{INTERNAL_FAILURE_MESSAGE, Metrics, RestartError, Result as RestartErrorResult, WatchGuard};

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use dh_core::{DeploymentKey, StatusPayload, TabBinding};
use dh_k8s::{DeploymentApi, RolloutVerdict, WatchEvent, evaluate_rollout};
use dh_sse::StatusStore;
use futures::FutureExt;
use log::{error, info, warn};
use tokio::sync::Notify;
use tokio::time::{Instant, timeout, timeout_at};
use tracing::Instrument;

/// Runs deployment restarts, at most one per deployment at a time.
///
/// `request_restart` returns once a restart is accepted; the rollout is
/// followed by a background worker that reports the outcome through the
/// [`StatusStore`].
#[derive(Clone)]
pub struct RestartOrchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    api: Arc<dyn DeploymentApi>,
    store: Arc<StatusStore>,
    restart_timeout: Duration,
    inflight: Mutex<HashMap<DeploymentKey, InFlight>>,
    idle: Notify,
    metrics: Metrics,
}

struct InFlight {
    tab_index: usize,
    started_at: Instant,
}

/// Removes the in-flight entry when the worker ends, however it ends
struct InFlightRelease {
    inner: Arc<Inner>,
    key: DeploymentKey,
}

impl Drop for InFlightRelease {
    fn drop(&mut self) {
        let remaining = {
            let mut inflight = self.inner.lock();
            inflight.remove(&self.key);
            inflight.len()
        };
        self.inner.metrics.in_flight(remaining);
        if remaining == 0 {
            self.inner.idle.notify_waiters();
        }
    }
}

impl RestartOrchestrator {
    pub fn new(api: Arc<dyn DeploymentApi>, store: Arc<StatusStore>, restart_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                store,
                restart_timeout,
                inflight: Mutex::new(HashMap::new()),
                idle: Notify::new(),
                metrics: Metrics::new(),
            }),
        }
    }

    /// Accept a restart for the tab's deployment.
    ///
    /// Emits `restarting` before returning. Fails with
    /// [`RestartError::InProgress`] while a restart of the same deployment is
    /// still running. Must be called from within a tokio runtime.
    #[track_caller]
    pub fn request_restart(&self, tab_index: usize, binding: &TabBinding) -> RestartErrorResult<()> {
        let Some(key) = binding.deployment_key.clone() else {
            self.inner.metrics.rejected("not_restartable");
            return Err(RestartError::not_restartable(tab_index));
        };

        {
            let mut inflight = self.inner.lock();
            if inflight.contains_key(&key) {
                self.inner.metrics.rejected("in_progress");
                info!("Restart of {key} rejected: already in progress");
                return Err(RestartError::in_progress(&key));
            }
            inflight.insert(
                key.clone(),
                InFlight {
                    tab_index,
                    started_at: Instant::now(),
                },
            );
            self.inner.metrics.in_flight(inflight.len());
        }

        // Dropping the release on an emit failure frees the deployment again.
        let release = InFlightRelease {
            inner: Arc::clone(&self.inner),
            key: key.clone(),
        };
        self.inner.store.emit(tab_index, StatusPayload::restarting())?;

        self.inner.metrics.accepted();
        info!("Restart of {key} accepted for tab {tab_index}");

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.run_worker(tab_index, key, release).await });

        Ok(())
    }

    pub fn is_restarting(&self, key: &DeploymentKey) -> bool {
        self.inner.lock().contains_key(key)
    }

    pub fn in_flight_count(&self) -> usize {
        self.inner.lock().len()
    }

    /// Wait for every in-flight restart to report its final state.
    ///
    /// Returns `false` if some were still running after `limit`.
    pub async fn wait_until_idle(&self, limit: Duration) -> bool {
        let wait = async {
            loop {
                let notified = self.inner.idle.notified();
                if self.in_flight_count() == 0 {
                    return;
                }
                notified.await;
            }
        };

        let drained = timeout(limit, wait).await.is_ok();
        if !drained {
            let pending: Vec<String> = self
                .inner
                .lock()
                .iter()
                .map(|(key, entry)| {
                    format!(
                        "{key} (tab {}, {}s)",
                        entry.tab_index,
                        entry.started_at.elapsed().as_secs()
                    )
                })
                .collect();
            warn!("Restarts still in flight at drain deadline: {}", pending.join(", "));
        }
        drained
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, HashMap<DeploymentKey, InFlight>> {
        self.inflight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run_worker(self: Arc<Self>, tab_index: usize, key: DeploymentKey, release: InFlightRelease) {
        let started = Instant::now();
        let span = tracing::info_span!(
            "restart",
            namespace = %key.namespace,
            deployment = %key.deployment,
            tab_index
        );

        let outcome = AssertUnwindSafe(self.restart(&key).instrument(span))
            .catch_unwind()
            .await;

        let (payload, label) = match outcome {
            Ok(Ok(())) => {
                info!("Restart of {key} completed in {:?}", started.elapsed());
                (StatusPayload::running(), "success")
            }
            Ok(Err(e)) => {
                warn!("Restart of {key} ended: {e}");
                (StatusPayload::error(e.status_message()), e.kind())
            }
            Err(_) => {
                error!("Restart worker for {key} panicked");
                (StatusPayload::error(INTERNAL_FAILURE_MESSAGE), "panic")
            }
        };

        if let Err(e) = self.store.emit(tab_index, payload) {
            error!("Failed to publish final status for {key}: {e}");
        }
        self.metrics.finished(label, started.elapsed());

        drop(release);
    }

    /// Trigger the rollout and follow it to a verdict.
    async fn restart(&self, key: &DeploymentKey) -> RestartErrorResult<()> {
        let deadline = Instant::now() + self.restart_timeout;

        let marker = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        self.api
            .patch_restart_marker(key, &marker)
            .await
            .map_err(|e| RestartError::api(key, &e))?;
        info!("Patched {key} with restart marker {marker}");

        let deployment = self
            .api
            .read_deployment(key)
            .await
            .map_err(|e| RestartError::api(key, &e))?;
        let Some(target_generation) = deployment.generation() else {
            return Err(RestartError::failed(key, "deployment reports no generation"));
        };
        info!("Waiting for {key} to roll out generation {target_generation}");

        let remaining = deadline.saturating_duration_since(Instant::now());
        let watch = match timeout_at(deadline, self.api.watch_deployment(key, remaining)).await {
            Err(_) => return Err(RestartError::timeout(key, self.restart_timeout)),
            Ok(watch) => watch.map_err(|e| RestartError::api(key, &e))?,
        };
        let mut watch = WatchGuard::new(watch);

        let verdict = self
            .follow_rollout(key, &mut watch, target_generation, deadline)
            .await;
        watch.stop();
        verdict
    }

    async fn follow_rollout(
        &self,
        key: &DeploymentKey,
        watch: &mut WatchGuard,
        target_generation: i64,
        deadline: Instant,
    ) -> RestartErrorResult<()> {
        loop {
            let event = match timeout_at(deadline, watch.next_event()).await {
                Err(_) => return Err(RestartError::timeout(key, self.restart_timeout)),
                Ok(Err(e)) => return Err(RestartError::api(key, &e)),
                // Server closed the watch before the deadline without a verdict.
                Ok(Ok(None)) => return Err(RestartError::timeout(key, self.restart_timeout)),
                Ok(Ok(Some(event))) => event,
            };

            match event {
                WatchEvent::Added(deployment) | WatchEvent::Modified(deployment) => {
                    match evaluate_rollout(&deployment, target_generation) {
                        RolloutVerdict::Ready => return Ok(()),
                        RolloutVerdict::Failed(message) => {
                            return Err(RestartError::failed(key, message));
                        }
                        RolloutVerdict::Pending => {}
                    }
                }
                WatchEvent::Deleted(_) => {
                    return Err(RestartError::failed(key, "deployment was deleted during rollout"));
                }
                WatchEvent::Error(status) => {
                    return Err(RestartError::failed(
                        key,
                        format!("watch error: {}", status.describe()),
                    ));
                }
                WatchEvent::Bookmark(_) => {}
            }
        }
    }
}
