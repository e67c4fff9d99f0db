use crate::error::{Result as ServerErrorResult, ServerError};

use dh_auth::JwtValidator;
use dh_config::{Config, TransportKind};
use dh_core::TabCatalog;
use dh_k8s::{DeploymentApi, KubeClient};
use dh_restart::RestartOrchestrator;
use dh_sse::{
    ConnectionRegistry, GatewayStatusTransport, HttpGateway, ShutdownCoordinator, StatusStore,
};

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::task::JoinHandle;

/// Settings the handlers read on every request
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub transport: TransportKind,
    pub heartbeat_interval: Duration,
    /// Callback secret enforcement is only active in production
    pub production: bool,
    pub callback_secret: Option<String>,
    pub auth_enabled: bool,
    pub cookie_name: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            transport: TransportKind::Direct,
            heartbeat_interval: Duration::from_secs(5),
            production: false,
            callback_secret: None,
            auth_enabled: false,
            cookie_name: "access_token".to_string(),
        }
    }
}

impl ApiSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            transport: config.sse.transport,
            heartbeat_interval: config.sse.heartbeat_interval(),
            production: config.server.is_production(),
            callback_secret: config.sse.callback_secret.clone(),
            auth_enabled: config.auth.enabled,
            cookie_name: config.auth.cookie_name.clone(),
        }
    }
}

/// Shared state behind every route
#[derive(Clone)]
pub struct AppState {
    pub catalog: TabCatalog,
    pub store: Arc<StatusStore>,
    pub orchestrator: RestartOrchestrator,
    /// Present only with the gateway transport
    pub registry: Option<ConnectionRegistry>,
    pub jwt_validator: Option<Arc<JwtValidator>>,
    pub shutdown: ShutdownCoordinator,
    pub metrics: Option<PrometheusHandle>,
    pub settings: Arc<ApiSettings>,
}

/// Everything `main` needs to run and later drain
pub struct Services {
    pub state: AppState,
    /// Gateway status dispatcher, when the gateway transport is active
    pub dispatcher: Option<JoinHandle<()>>,
}

impl Services {
    /// Wire the status channel, orchestrator and auth from configuration.
    ///
    /// Must run inside a tokio runtime when the gateway transport is chosen.
    pub fn build(
        config: &Config,
        config_dir: &Path,
        metrics: Option<PrometheusHandle>,
    ) -> ServerErrorResult<Self> {
        let catalog = config.load_tabs(config_dir)?;
        info!(
            "Loaded {} tabs ({} restartable deployments)",
            catalog.len(),
            catalog.deployments().len()
        );

        let api: Arc<dyn DeploymentApi> = Arc::new(KubeClient::from_config(&config.kubernetes)?);
        let jwt_validator = build_jwt_validator(config, config_dir)?;

        let (store, registry, dispatcher) = match config.sse.transport {
            TransportKind::Direct => (Arc::new(StatusStore::new(catalog.len())), None, None),
            TransportKind::Gateway => {
                let gateway = HttpGateway::new(&config.sse.gateway_url, config.sse.gateway_timeout())?;
                let registry = ConnectionRegistry::new(Arc::new(gateway));
                let (transport, dispatcher) = GatewayStatusTransport::spawn(registry.clone());
                let store = Arc::new(StatusStore::with_transport(
                    catalog.len(),
                    Arc::new(transport),
                ));
                store.attach_to_registry(&registry);
                (store, Some(registry), Some(dispatcher))
            }
        };

        let orchestrator =
            RestartOrchestrator::new(api, Arc::clone(&store), config.restart.timeout());

        Ok(Self {
            state: AppState {
                catalog,
                store,
                orchestrator,
                registry,
                jwt_validator,
                shutdown: ShutdownCoordinator::new(),
                metrics,
                settings: Arc::new(ApiSettings::from_config(config)),
            },
            dispatcher,
        })
    }
}

fn build_jwt_validator(
    config: &Config,
    config_dir: &Path,
) -> ServerErrorResult<Option<Arc<JwtValidator>>> {
    if !config.auth.enabled {
        warn!("Authentication DISABLED - gateway connections bind to the local user");
        return Ok(None);
    }

    let validator = if let Some(ref secret) = config.auth.jwt_secret {
        JwtValidator::with_hs256(secret.as_bytes())
    } else if let Some(ref key_path) = config.auth.jwt_public_key_path {
        let full_path = config_dir.join(key_path);
        let public_key =
            std::fs::read_to_string(&full_path).map_err(|e| ServerError::JwtKeyFile {
                path: full_path.display().to_string(),
                source: e,
            })?;
        JwtValidator::with_rs256(&public_key)?
    } else {
        // validate() rejects this combination
        return Err(ServerError::Config(dh_config::ConfigError::auth(
            "auth.enabled requires a JWT key source",
        )));
    };

    info!("JWT: {} identity binding enabled", validator.algorithm());
    Ok(Some(Arc::new(validator)))
}
