use crate::{OutboundEvent, Result as SseErrorResult};

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client as ReqwestClient, StatusCode};
use serde::Serialize;

const SEND_PATH: &str = "/internal/send";

/// Result of one push to the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Delivered,
    /// The gateway no longer knows the token
    NotFound,
    Rejected(u16),
    Unreachable(String),
}

impl SendOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delivered => "success",
            Self::NotFound => "not_found",
            Self::Rejected(_) => "rejected",
            Self::Unreachable(_) => "unreachable",
        }
    }
}

/// Push side of an external SSE gateway
#[async_trait]
pub trait GatewayTransport: Send + Sync {
    async fn send(&self, token: &str, event: &OutboundEvent) -> SendOutcome;

    /// Ask the gateway to close a connection. Best effort.
    async fn close(&self, token: &str) -> SendOutcome;
}

#[derive(Serialize)]
struct SendRequest<'a> {
    token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    event: Option<EventData<'a>>,
    close: bool,
}

#[derive(Serialize)]
struct EventData<'a> {
    name: &'a str,
    data: &'a str,
}

/// Gateway reached over HTTP at `{base_url}/internal/send`
pub struct HttpGateway {
    send_url: String,
    client: ReqwestClient,
}

impl HttpGateway {
    pub fn new(base_url: &str, timeout: Duration) -> SseErrorResult<Self> {
        let client = ReqwestClient::builder().timeout(timeout).build()?;
        Ok(Self {
            send_url: format!("{}{SEND_PATH}", base_url.trim_end_matches('/')),
            client,
        })
    }

    async fn post(&self, body: &SendRequest<'_>) -> SendOutcome {
        let response = match self.client.post(&self.send_url).json(body).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Gateway request failed: {e}");
                return SendOutcome::Unreachable(e.to_string());
            }
        };

        match response.status() {
            StatusCode::OK => SendOutcome::Delivered,
            StatusCode::NOT_FOUND => SendOutcome::NotFound,
            status => {
                let text = response.text().await.unwrap_or_default();
                warn!("Gateway returned {status}: {text}");
                SendOutcome::Rejected(status.as_u16())
            }
        }
    }
}

#[async_trait]
impl GatewayTransport for HttpGateway {
    async fn send(&self, token: &str, event: &OutboundEvent) -> SendOutcome {
        let body = SendRequest {
            token,
            event: Some(EventData {
                name: &event.name,
                data: &event.data,
            }),
            close: false,
        };
        let outcome = self.post(&body).await;
        debug!("Gateway send '{}' -> {}", event.name, outcome.as_str());
        outcome
    }

    async fn close(&self, token: &str) -> SendOutcome {
        let body = SendRequest {
            token,
            event: None,
            close: true,
        };
        self.post(&body).await
    }
}
