use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, PoisonError};

use log::warn;

type Handler<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Synchronous observer list.
///
/// Handlers run in registration order on the publishing thread, outside the
/// bus lock. A panicking handler is logged and skipped; the rest still run and
/// the panic never reaches the publisher.
pub struct EventBus<T> {
    name: &'static str,
    handlers: Arc<Mutex<Vec<Handler<T>>>>,
}

impl<T> EventBus<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            handlers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn subscribe<F>(&self, handler: F)
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(handler));
    }

    pub fn len(&self) -> usize {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns how many handlers completed without panicking.
    pub fn publish(&self, event: &T) -> usize {
        let handlers: Vec<Handler<T>> = self
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let mut completed = 0;
        for (position, handler) in handlers.iter().enumerate() {
            match catch_unwind(AssertUnwindSafe(|| handler(event))) {
                Ok(()) => completed += 1,
                Err(panic) => {
                    let reason = panic
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| panic.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "non-string panic".to_string());
                    warn!(
                        "{} observer #{position} panicked: {reason}",
                        self.name
                    );
                }
            }
        }
        completed
    }
}

impl<T> Clone for EventBus<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            handlers: Arc::clone(&self.handlers),
        }
    }
}
