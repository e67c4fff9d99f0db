use crate::{ConnectionRegistry, OutboundEvent, Recipient, TAB_STATUS_EVENT, TabStatusUpdate};

use log::{debug, error};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Delivery seam between the [`crate::StatusStore`] and whatever carries
/// updates to clients.
///
/// `deliver` must not block: implementations queue and return.
pub trait StatusTransport: Send + Sync {
    fn deliver(&self, recipient: Recipient, update: &TabStatusUpdate);
}

/// Status transport that pushes `tab_status` events through the gateway.
///
/// Updates are queued to a single dispatcher task that sends them in order,
/// so a slow gateway never stalls the emitter and a subscriber never sees a
/// later update before an earlier one.
pub struct GatewayStatusTransport {
    tx: mpsc::UnboundedSender<(Recipient, OutboundEvent)>,
}

impl GatewayStatusTransport {
    /// Start the dispatcher. It runs until every transport handle is dropped.
    pub fn spawn(registry: ConnectionRegistry) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<(Recipient, OutboundEvent)>();

        let handle = tokio::spawn(async move {
            while let Some((recipient, event)) = rx.recv().await {
                if !registry.send_event(&recipient, &event, None).await {
                    debug!("tab_status to {recipient} reached no connection");
                }
            }
            debug!("Gateway status dispatcher stopped");
        });

        (Self { tx }, handle)
    }
}

impl StatusTransport for GatewayStatusTransport {
    fn deliver(&self, recipient: Recipient, update: &TabStatusUpdate) {
        let event = match OutboundEvent::json(TAB_STATUS_EVENT, update) {
            Ok(event) => event,
            Err(e) => {
                error!("Failed to encode tab_status for tab {}: {e}", update.tab_index);
                return;
            }
        };

        if self.tx.send((recipient, event)).is_err() {
            error!(
                "Gateway status dispatcher is gone; dropping update for tab {}",
                update.tab_index
            );
        }
    }
}
