mod status_store;

use crate::{GatewayTransport, OutboundEvent, SendOutcome};

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

/// In-memory gateway that records every push
#[derive(Default)]
pub(crate) struct FakeGateway {
    pub sent: Mutex<Vec<(String, OutboundEvent)>>,
    pub closed: Mutex<Vec<String>>,
    /// Per-token outcome override; unlisted tokens are delivered
    pub outcomes: Mutex<HashMap<String, SendOutcome>>,
}

impl FakeGateway {
    pub fn fail_token(&self, token: &str, outcome: SendOutcome) {
        self.outcomes
            .lock()
            .unwrap()
            .insert(token.to_string(), outcome);
    }

    pub fn sent_tokens(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(token, _)| token.clone())
            .collect()
    }

    pub fn sent_events(&self) -> Vec<(String, OutboundEvent)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl GatewayTransport for FakeGateway {
    async fn send(&self, token: &str, event: &OutboundEvent) -> SendOutcome {
        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .get(token)
            .cloned()
            .unwrap_or(SendOutcome::Delivered);
        if outcome.is_delivered() {
            self.sent
                .lock()
                .unwrap()
                .push((token.to_string(), event.clone()));
        }
        outcome
    }

    async fn close(&self, token: &str) -> SendOutcome {
        self.closed.lock().unwrap().push(token.to_string());
        SendOutcome::Delivered
    }
}
