use crate::{
    ConnectionInfo, EventBus, GatewayTransport, LOCAL_USER_SUBJECT, Metrics, OutboundEvent,
    Recipient, SendOutcome,
};

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

/// Registry of live gateway connections.
///
/// Keeps `request_id -> connection` and `token -> request_id` in step under
/// one lock. Gateway I/O and observer callbacks always run after the lock is
/// released, so observers may call back into the registry.
pub struct ConnectionRegistry {
    inner: Arc<Mutex<RegistryInner>>,
    gateway: Arc<dyn GatewayTransport>,
    on_connect: EventBus<String>,
    on_disconnect: EventBus<String>,
    metrics: Metrics,
}

#[derive(Default)]
struct RegistryInner {
    /// Active connections by request_id
    connections: HashMap<String, Connection>,
    /// Reverse index for disconnect callbacks
    tokens: HashMap<String, String>,
}

#[derive(Debug, Clone)]
struct Connection {
    token: String,
    url: String,
    subject: Option<String>,
    connected_at: DateTime<Utc>,
}

impl RegistryInner {
    /// Drop both mappings if `request_id` still points at `token`.
    fn remove_if_current(&mut self, request_id: &str, token: &str) -> bool {
        let is_current = self
            .connections
            .get(request_id)
            .is_some_and(|conn| conn.token == token);
        if is_current {
            self.connections.remove(request_id);
            self.tokens.remove(token);
        }
        is_current
    }
}

impl ConnectionRegistry {
    pub fn new(gateway: Arc<dyn GatewayTransport>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RegistryInner::default())),
            gateway,
            on_connect: EventBus::new("on_connect"),
            on_disconnect: EventBus::new("on_disconnect"),
            metrics: Metrics::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Observer invoked with the request id after every successful connect
    pub fn register_on_connect<F>(&self, callback: F)
    where
        F: Fn(&String) + Send + Sync + 'static,
    {
        self.on_connect.subscribe(callback);
    }

    /// Observer invoked with the request id after a matching disconnect
    pub fn register_on_disconnect<F>(&self, callback: F)
    where
        F: Fn(&String) + Send + Sync + 'static,
    {
        self.on_disconnect.subscribe(callback);
    }

    /// Register a connection, retiring any previous one for `request_id`.
    pub async fn on_connect(&self, request_id: &str, token: &str, url: &str) {
        let replaced = {
            let mut inner = self.lock();

            // A token reused under a different request id invalidates that entry.
            if let Some(previous_owner) = inner.tokens.get(token).cloned()
                && previous_owner != request_id
            {
                inner.remove_if_current(&previous_owner, token);
            }

            let replaced = inner
                .connections
                .insert(
                    request_id.to_string(),
                    Connection {
                        token: token.to_string(),
                        url: url.to_string(),
                        subject: None,
                        connected_at: Utc::now(),
                    },
                )
                .map(|old| old.token)
                .filter(|old_token| old_token != token);

            if let Some(ref old_token) = replaced {
                inner.tokens.remove(old_token);
            }
            inner
                .tokens
                .insert(token.to_string(), request_id.to_string());

            self.metrics.gateway_connected();
            self.metrics.active_connections(inner.connections.len());
            replaced
        };

        info!("Registered gateway connection request_id={request_id} token={token}");
        self.on_connect.publish(&request_id.to_string());

        // Best effort; the new connection is already live.
        if let Some(old_token) = replaced {
            debug!("Closing replaced connection request_id={request_id} token={old_token}");
            match self.gateway.close(&old_token).await {
                SendOutcome::Delivered | SendOutcome::NotFound => {}
                outcome => warn!(
                    "Failed to close replaced connection request_id={request_id} token={old_token}: {outcome:?}"
                ),
            }
        }
    }

    /// Remove the connection owning `token`. Stale tokens are ignored.
    pub fn on_disconnect(&self, token: &str) {
        let request_id = {
            let mut inner = self.lock();

            let Some(request_id) = inner.tokens.get(token).cloned() else {
                debug!("Disconnect for unknown token={token}");
                return;
            };

            if !inner.remove_if_current(&request_id, token) {
                debug!("Stale disconnect request_id={request_id} token={token}");
                inner.tokens.remove(token);
                return;
            }

            self.metrics.gateway_disconnected();
            self.metrics.active_connections(inner.connections.len());
            request_id
        };

        info!("Unregistered gateway connection request_id={request_id} token={token}");
        self.on_disconnect.publish(&request_id);
    }

    pub fn has_connection(&self, request_id: &str) -> bool {
        self.lock().connections.contains_key(request_id)
    }

    pub fn connection_info(&self, request_id: &str) -> Option<ConnectionInfo> {
        self.lock()
            .connections
            .get(request_id)
            .map(|conn| ConnectionInfo {
                request_id: request_id.to_string(),
                subject: conn.subject.clone(),
                url: conn.url.clone(),
                connected_at: conn.connected_at,
            })
    }

    pub fn total_count(&self) -> usize {
        self.lock().connections.len()
    }

    /// Attach an authenticated subject to a live connection.
    pub fn bind_identity(&self, request_id: &str, subject: &str) {
        {
            let mut inner = self.lock();
            let Some(conn) = inner.connections.get_mut(request_id) else {
                self.metrics.identity_binding("failed");
                warn!("Identity binding failed: no active connection request_id={request_id}");
                return;
            };
            conn.subject = Some(subject.to_string());
        }

        self.metrics.identity_binding("success");
        info!("Identity bound request_id={request_id} subject={subject}");
    }

    /// Deliver `event` to one connection or broadcast it.
    ///
    /// `target_subject` narrows a broadcast to connections bound to that
    /// subject or to the local-user sentinel. Returns whether at least one
    /// recipient accepted the event.
    pub async fn send_event(
        &self,
        recipient: &Recipient,
        event: &OutboundEvent,
        target_subject: Option<&str>,
    ) -> bool {
        let targets: Vec<(String, String)> = {
            let inner = self.lock();
            match recipient {
                Recipient::Connection(request_id) => match inner.connections.get(request_id) {
                    Some(conn) => vec![(request_id.clone(), conn.token.clone())],
                    None => {
                        warn!("Cannot send '{}': no connection request_id={request_id}", event.name);
                        return false;
                    }
                },
                Recipient::All => inner
                    .connections
                    .iter()
                    .filter(|(_, conn)| match target_subject {
                        None => true,
                        Some(subject) => conn
                            .subject
                            .as_deref()
                            .is_some_and(|s| s == subject || s == LOCAL_USER_SUBJECT),
                    })
                    .map(|(request_id, conn)| (request_id.clone(), conn.token.clone()))
                    .collect(),
            }
        };

        if targets.is_empty() {
            debug!("Broadcast '{}': no active connections", event.name);
            return false;
        }

        let mut delivered = 0usize;
        for (request_id, token) in &targets {
            if self.send_to_token(request_id, token, event).await {
                delivered += 1;
            }
        }

        if *recipient == Recipient::All {
            debug!(
                "Broadcast '{}' delivered to {delivered}/{}",
                event.name,
                targets.len()
            );
        }
        delivered > 0
    }

    async fn send_to_token(&self, request_id: &str, token: &str, event: &OutboundEvent) -> bool {
        let started = Instant::now();
        let outcome = self.gateway.send(token, event).await;
        self.metrics.send_latency(started.elapsed());
        self.metrics.event_sent(&event.name, outcome.as_str());

        match outcome {
            SendOutcome::Delivered => true,
            SendOutcome::NotFound => {
                warn!("Gateway lost connection request_id={request_id} token={token}; removing");
                let mut inner = self.lock();
                if inner.remove_if_current(request_id, token) {
                    self.metrics.active_connections(inner.connections.len());
                }
                false
            }
            SendOutcome::Rejected(status) => {
                warn!("Gateway rejected event request_id={request_id} status={status}");
                false
            }
            SendOutcome::Unreachable(reason) => {
                warn!("Gateway unreachable request_id={request_id}: {reason}");
                false
            }
        }
    }
}

impl Clone for ConnectionRegistry {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            gateway: Arc::clone(&self.gateway),
            on_connect: self.on_connect.clone(),
            on_disconnect: self.on_disconnect.clone(),
            metrics: self.metrics.clone(),
        }
    }
}
