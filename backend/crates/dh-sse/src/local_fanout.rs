use crate::{Recipient, StatusTransport, TabStatusUpdate};

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::debug;
use tokio::sync::mpsc;
use uuid::Uuid;

/// In-process status transport backing direct SSE streams.
///
/// Each subscriber owns an unbounded queue so delivery never waits on a slow
/// reader. Queues preserve send order, which keeps per-subscriber ordering.
#[derive(Default)]
pub struct LocalFanout {
    subscribers: Mutex<HashMap<String, Subscriber>>,
}

struct Subscriber {
    tab_index: usize,
    tx: mpsc::UnboundedSender<TabStatusUpdate>,
}

impl LocalFanout {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Subscriber>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a queue for one tab. Returns the subscriber id.
    pub fn register(&self, tab_index: usize, tx: mpsc::UnboundedSender<TabStatusUpdate>) -> String {
        let id = Uuid::new_v4().to_string();
        self.lock()
            .insert(id.clone(), Subscriber { tab_index, tx });
        debug!("Stream subscriber {id} attached to tab {tab_index}");
        id
    }

    pub fn remove(&self, id: &str) -> bool {
        let removed = self.lock().remove(id).is_some();
        if removed {
            debug!("Stream subscriber {id} detached");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StatusTransport for LocalFanout {
    fn deliver(&self, recipient: Recipient, update: &TabStatusUpdate) {
        let mut subscribers = self.lock();
        match recipient {
            Recipient::Connection(id) => {
                let closed = subscribers
                    .get(&id)
                    .is_some_and(|sub| sub.tx.send(update.clone()).is_err());
                if closed {
                    subscribers.remove(&id);
                }
            }
            Recipient::All => {
                // Receivers dropped without a remove() are pruned here.
                subscribers.retain(|id, sub| {
                    if sub.tab_index != update.tab_index {
                        return true;
                    }
                    let alive = sub.tx.send(update.clone()).is_ok();
                    if !alive {
                        debug!("Pruning closed stream subscriber {id}");
                    }
                    alive
                });
            }
        }
    }
}
