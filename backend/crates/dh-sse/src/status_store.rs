use crate::{
    ConnectionRegistry, LocalFanout, Metrics, Recipient, Result as SseErrorResult, SseError,
    StatusSubscription, StatusTransport, TabStatusUpdate,
};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use dh_core::StatusPayload;
use log::{debug, info};
use tokio::sync::mpsc;

/// Last known status per tab, plus delivery of every transition.
///
/// Every tab starts out `running`. Store and delivery happen under one lock,
/// so a subscriber attaching concurrently with `emit` either sees the new
/// value in its replay or receives it as a live update, never neither.
pub struct StatusStore {
    statuses: Mutex<Vec<StatusPayload>>,
    fanout: Arc<LocalFanout>,
    external: Option<Arc<dyn StatusTransport>>,
    metrics: Metrics,
}

impl StatusStore {
    /// Store with in-process delivery only
    pub fn new(tab_count: usize) -> Self {
        Self {
            statuses: Mutex::new(vec![StatusPayload::running(); tab_count]),
            fanout: Arc::new(LocalFanout::new()),
            external: None,
            metrics: Metrics::new(),
        }
    }

    /// Store that also pushes every transition through `transport`
    pub fn with_transport(tab_count: usize, transport: Arc<dyn StatusTransport>) -> Self {
        Self {
            external: Some(transport),
            ..Self::new(tab_count)
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<StatusPayload>> {
        self.statuses.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn tab_count(&self) -> usize {
        self.lock().len()
    }

    #[track_caller]
    pub fn current(&self, tab_index: usize) -> SseErrorResult<StatusPayload> {
        let statuses = self.lock();
        statuses
            .get(tab_index)
            .cloned()
            .ok_or_else(|| SseError::tab_not_found(tab_index, statuses.len()))
    }

    /// Snapshot of every tab, in index order
    pub fn snapshot(&self) -> Vec<StatusPayload> {
        self.lock().clone()
    }

    /// Record `payload` as the tab's status and hand it to every subscriber.
    #[track_caller]
    pub fn emit(&self, tab_index: usize, payload: StatusPayload) -> SseErrorResult<()> {
        let mut statuses = self.lock();
        let tab_count = statuses.len();
        let Some(slot) = statuses.get_mut(tab_index) else {
            return Err(SseError::tab_not_found(tab_index, tab_count));
        };

        let update = TabStatusUpdate::new(tab_index, &payload);
        *slot = payload;

        self.fanout.deliver(Recipient::All, &update);
        if let Some(external) = &self.external {
            external.deliver(Recipient::All, &update);
        }

        self.metrics.status_emitted(update.state.as_str());
        info!("Tab {tab_index} status -> {}", update.state);
        Ok(())
    }

    /// Attach a direct-stream subscriber to one tab.
    ///
    /// The current value is queued before registration, so it is always the
    /// subscriber's first update.
    #[track_caller]
    pub fn subscribe(&self, tab_index: usize) -> SseErrorResult<StatusSubscription> {
        let statuses = self.lock();
        let Some(current) = statuses.get(tab_index) else {
            return Err(SseError::tab_not_found(tab_index, statuses.len()));
        };

        let (tx, rx) = mpsc::unbounded_channel();
        // Receiver is alive in this scope.
        let _ = tx.send(TabStatusUpdate::new(tab_index, current));
        let id = self.fanout.register(tab_index, tx);

        Ok(StatusSubscription::new(
            id,
            tab_index,
            rx,
            Arc::clone(&self.fanout),
            self.metrics.clone(),
        ))
    }

    /// Send the current value of every tab to one gateway connection.
    pub fn replay_to(&self, request_id: &str) {
        let Some(external) = &self.external else {
            return;
        };

        let statuses = self.lock();
        for (tab_index, payload) in statuses.iter().enumerate() {
            external.deliver(
                Recipient::Connection(request_id.to_string()),
                &TabStatusUpdate::new(tab_index, payload),
            );
        }
        debug!(
            "Replayed {} tab statuses to request_id={request_id}",
            statuses.len()
        );
    }

    /// Replay current state to every connection the registry accepts.
    pub fn attach_to_registry(self: &Arc<Self>, registry: &ConnectionRegistry) {
        let store: Weak<Self> = Arc::downgrade(self);
        registry.register_on_connect(move |request_id: &String| {
            if let Some(store) = store.upgrade() {
                store.replay_to(request_id);
            }
        });
        registry.register_on_disconnect(|request_id: &String| {
            debug!("Status delivery to request_id={request_id} ended");
        });
    }

    /// Live direct-stream subscribers across all tabs
    pub fn subscriber_count(&self) -> usize {
        self.fanout.len()
    }
}
