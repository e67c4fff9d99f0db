#![allow(dead_code)]

//! Test infrastructure for dh-server router tests

use dh_core::{DeploymentKey, Tab, TabCatalog};
use dh_k8s::{
    Deployment, DeploymentApi, DeploymentSpec, DeploymentStatus, DeploymentWatch, ObjectMeta,
    Result as K8sErrorResult, WatchEvent,
};
use dh_restart::RestartOrchestrator;
use dh_server::{ApiSettings, AppState};
use dh_sse::{
    ConnectionRegistry, GatewayStatusTransport, GatewayTransport, OutboundEvent, SendOutcome,
    ShutdownCoordinator, StatusStore,
};

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::response::Response;
use http_body_util::BodyExt;
use tokio::sync::Notify;

pub const RESTARTABLE_TAB: usize = 1;
pub const STATIC_TAB: usize = 0;

pub fn catalog() -> TabCatalog {
    TabCatalog::new(vec![
        Tab {
            text: "Docs".to_string(),
            icon_url: "/icons/docs.svg".to_string(),
            iframe_url: "https://docs.example.com".to_string(),
            tab_color: None,
            k8s: None,
        },
        Tab {
            text: "Grafana".to_string(),
            icon_url: "/icons/grafana.svg".to_string(),
            iframe_url: "https://grafana.example.com".to_string(),
            tab_color: Some("#ff6600".to_string()),
            k8s: Some(DeploymentKey::new("monitoring", "grafana")),
        },
    ])
    .unwrap()
}

/// Orchestration API whose patch blocks until `release` is notified,
/// then rolls out immediately.
#[derive(Default)]
pub struct GatedApi {
    pub release: Arc<Notify>,
}

struct ReadyWatch {
    sent: bool,
}

#[async_trait]
impl DeploymentWatch for ReadyWatch {
    async fn next_event(&mut self) -> K8sErrorResult<Option<WatchEvent>> {
        if self.sent {
            return Ok(None);
        }
        self.sent = true;
        Ok(Some(WatchEvent::Modified(ready_deployment())))
    }

    fn stop(&mut self) {}
}

fn ready_deployment() -> Deployment {
    Deployment {
        metadata: ObjectMeta {
            generation: Some(3),
            ..ObjectMeta::default()
        },
        spec: Some(DeploymentSpec { replicas: Some(1) }),
        status: Some(DeploymentStatus {
            observed_generation: Some(3),
            replicas: Some(1),
            ready_replicas: Some(1),
            available_replicas: Some(1),
            updated_replicas: Some(1),
            conditions: Vec::new(),
        }),
    }
}

#[async_trait]
impl DeploymentApi for GatedApi {
    async fn patch_restart_marker(&self, _key: &DeploymentKey, _marker: &str) -> K8sErrorResult<()> {
        self.release.notified().await;
        Ok(())
    }

    async fn read_deployment(&self, _key: &DeploymentKey) -> K8sErrorResult<Deployment> {
        Ok(ready_deployment())
    }

    async fn watch_deployment(
        &self,
        _key: &DeploymentKey,
        _timeout: Duration,
    ) -> K8sErrorResult<Box<dyn DeploymentWatch>> {
        Ok(Box::new(ReadyWatch { sent: false }))
    }
}

/// Gateway that records every delivered event
#[derive(Default)]
pub struct RecordingGateway {
    pub sent: Mutex<Vec<(String, OutboundEvent)>>,
}

#[async_trait]
impl GatewayTransport for RecordingGateway {
    async fn send(&self, token: &str, event: &OutboundEvent) -> SendOutcome {
        self.sent
            .lock()
            .unwrap()
            .push((token.to_string(), event.clone()));
        SendOutcome::Delivered
    }

    async fn close(&self, _token: &str) -> SendOutcome {
        SendOutcome::Delivered
    }
}

pub struct TestApp {
    pub state: AppState,
    pub api: Arc<GatedApi>,
    pub gateway: Option<Arc<RecordingGateway>>,
}

/// Direct-transport state
pub fn direct_app(settings: ApiSettings) -> TestApp {
    let catalog = catalog();
    let api = Arc::new(GatedApi::default());
    let store = Arc::new(StatusStore::new(catalog.len()));
    let orchestrator = RestartOrchestrator::new(api.clone(), store.clone(), Duration::from_secs(5));

    TestApp {
        state: AppState {
            catalog,
            store,
            orchestrator,
            registry: None,
            jwt_validator: None,
            shutdown: ShutdownCoordinator::new(),
            metrics: None,
            settings: Arc::new(settings),
        },
        api,
        gateway: None,
    }
}

/// Gateway-transport state; needs a tokio runtime
pub fn gateway_app(settings: ApiSettings) -> TestApp {
    let catalog = catalog();
    let api = Arc::new(GatedApi::default());
    let gateway = Arc::new(RecordingGateway::default());
    let registry = ConnectionRegistry::new(gateway.clone());
    let (transport, _dispatcher) = GatewayStatusTransport::spawn(registry.clone());
    let store = Arc::new(StatusStore::with_transport(catalog.len(), Arc::new(transport)));
    store.attach_to_registry(&registry);
    let orchestrator = RestartOrchestrator::new(api.clone(), store.clone(), Duration::from_secs(5));

    TestApp {
        state: AppState {
            catalog,
            store,
            orchestrator,
            registry: Some(registry),
            jwt_validator: None,
            shutdown: ShutdownCoordinator::new(),
            metrics: None,
            settings: Arc::new(settings),
        },
        api,
        gateway: Some(gateway),
    }
}

pub async fn json_body(response: Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

pub fn empty() -> Body {
    Body::empty()
}
