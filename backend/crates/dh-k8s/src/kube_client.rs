use crate::{
    ApiStatus, Deployment, DeploymentApi, DeploymentWatch, K8sError, RESTARTED_AT_ANNOTATION,
    Result as K8sErrorResult, WatchDecoder, WatchEvent,
};

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use dh_config::KubernetesConfig;
use dh_core::DeploymentKey;
use log::{debug, info};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Certificate, Client as ReqwestClient, Method, RequestBuilder, Response, Url};

const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";
const SERVICE_HOST_ENV: &str = "KUBERNETES_SERVICE_HOST";
const SERVICE_PORT_ENV: &str = "KUBERNETES_SERVICE_PORT";

const STRATEGIC_MERGE_PATCH: &str = "application/strategic-merge-patch+json";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
enum BearerToken {
    None,
    Static(String),
    /// Re-read per request; projected service-account tokens rotate.
    File(PathBuf),
}

/// Minimal `apps/v1` client over the REST API
#[derive(Debug, Clone)]
pub struct KubeClient {
    base_url: Url,
    http: ReqwestClient,
    token: BearerToken,
}

impl KubeClient {
    /// Plain client without credentials (e.g. behind `kubectl proxy`).
    #[track_caller]
    pub fn new(base_url: &str) -> K8sErrorResult<Self> {
        Self::with_http(base_url, ReqwestClient::new())
    }

    #[track_caller]
    fn with_http(base_url: &str, http: ReqwestClient) -> K8sErrorResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| K8sError::config(format!("invalid API server URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(K8sError::config(format!(
                "API server URL '{base_url}' cannot be used as a base"
            )));
        }

        Ok(Self {
            base_url,
            http,
            token: BearerToken::None,
        })
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.token = BearerToken::Static(token.into());
        self
    }

    pub fn with_token_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.token = BearerToken::File(path.into());
        self
    }

    /// Build from `[kubernetes]`, falling back to in-cluster discovery.
    pub fn from_config(config: &KubernetesConfig) -> K8sErrorResult<Self> {
        let service_account = Path::new(SERVICE_ACCOUNT_DIR);

        let (base_url, in_cluster) = match config.api_server {
            Some(ref server) => (server.clone(), false),
            None => (in_cluster_url()?, true),
        };

        let ca_path = config
            .ca_cert_path
            .as_ref()
            .map(PathBuf::from)
            .or_else(|| in_cluster.then(|| service_account.join("ca.crt")));
        let token_path = config
            .token_path
            .as_ref()
            .map(PathBuf::from)
            .or_else(|| in_cluster.then(|| service_account.join("token")));

        let mut builder = ReqwestClient::builder();
        if let Some(ref path) = ca_path {
            let pem = std::fs::read(path).map_err(|e| {
                K8sError::config(format!("cannot read CA bundle {}: {e}", path.display()))
            })?;
            let certificate = Certificate::from_pem(&pem).map_err(|e| {
                K8sError::config(format!("invalid CA bundle {}: {e}", path.display()))
            })?;
            builder = builder.add_root_certificate(certificate);
        }
        if config.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let http = builder.build().map_err(K8sError::from_reqwest)?;

        let mut client = Self::with_http(&base_url, http)?;
        if let Some(path) = token_path {
            if !path.is_file() {
                return Err(K8sError::config(format!(
                    "service account token not found at {}",
                    path.display()
                )));
            }
            client = client.with_token_file(path);
        }

        info!(
            "Kubernetes client targeting {} ({})",
            client.base_url,
            if in_cluster {
                "in-cluster"
            } else {
                "configured"
            }
        );

        Ok(client)
    }

    fn deployments_url(&self, namespace: &str) -> K8sErrorResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| K8sError::config("API server URL cannot be a base"))?
            .pop_if_empty()
            .extend(["apis", "apps", "v1", "namespaces", namespace, "deployments"]);
        Ok(url)
    }

    fn deployment_url(&self, key: &DeploymentKey) -> K8sErrorResult<Url> {
        let mut url = self.deployments_url(&key.namespace)?;
        url.path_segments_mut()
            .map_err(|_| K8sError::config("API server URL cannot be a base"))?
            .push(&key.deployment);
        Ok(url)
    }

    async fn request(&self, method: Method, url: Url) -> K8sErrorResult<RequestBuilder> {
        let mut req = self
            .http
            .request(method, url)
            .header(ACCEPT, "application/json");

        match self.token {
            BearerToken::None => {}
            BearerToken::Static(ref token) => {
                req = req.header(AUTHORIZATION, format!("Bearer {token}"));
            }
            BearerToken::File(ref path) => {
                let token = tokio::fs::read_to_string(path).await.map_err(|e| {
                    K8sError::config(format!("cannot read token {}: {e}", path.display()))
                })?;
                req = req.header(AUTHORIZATION, format!("Bearer {}", token.trim()));
            }
        }

        Ok(req)
    }

    /// Turn a non-2xx response into [`K8sError::Api`].
    async fn check(response: Response) -> K8sErrorResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let api_status = serde_json::from_str::<ApiStatus>(&body).unwrap_or_default();
        let reason = api_status
            .reason
            .filter(|r| !r.is_empty())
            .or_else(|| status.canonical_reason().map(String::from))
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

        Err(K8sError::api(status.as_u16(), reason, api_status.message))
    }
}

fn in_cluster_url() -> K8sErrorResult<String> {
    let host = std::env::var(SERVICE_HOST_ENV).map_err(|_| {
        K8sError::config(format!(
            "kubernetes.api_server is not set and {SERVICE_HOST_ENV} is missing"
        ))
    })?;
    let port = std::env::var(SERVICE_PORT_ENV).unwrap_or_else(|_| String::from("443"));

    if host.contains(':') {
        Ok(format!("https://[{host}]:{port}"))
    } else {
        Ok(format!("https://{host}:{port}"))
    }
}

#[async_trait]
impl DeploymentApi for KubeClient {
    async fn patch_restart_marker(
        &self,
        key: &DeploymentKey,
        marker: &str,
    ) -> K8sErrorResult<()> {
        let mut annotations = serde_json::Map::new();
        annotations.insert(RESTARTED_AT_ANNOTATION.to_string(), marker.into());
        let body = serde_json::json!({
            "spec": { "template": { "metadata": { "annotations": annotations } } }
        });

        let req = self
            .request(Method::PATCH, self.deployment_url(key)?)
            .await?
            .header(CONTENT_TYPE, STRATEGIC_MERGE_PATCH)
            .body(body.to_string())
            .timeout(REQUEST_TIMEOUT);

        Self::check(req.send().await?).await?;
        debug!("Patched {RESTARTED_AT_ANNOTATION}={marker} on {key}");
        Ok(())
    }

    async fn read_deployment(&self, key: &DeploymentKey) -> K8sErrorResult<Deployment> {
        let req = self
            .request(Method::GET, self.deployment_url(key)?)
            .await?
            .timeout(REQUEST_TIMEOUT);

        let response = Self::check(req.send().await?).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| K8sError::decode(format!("invalid deployment object: {e}")))
    }

    async fn watch_deployment(
        &self,
        key: &DeploymentKey,
        timeout: Duration,
    ) -> K8sErrorResult<Box<dyn DeploymentWatch>> {
        let mut url = self.deployments_url(&key.namespace)?;
        url.query_pairs_mut()
            .append_pair("watch", "true")
            .append_pair("fieldSelector", &format!("metadata.name={}", key.deployment))
            .append_pair("timeoutSeconds", &timeout.as_secs().max(1).to_string());

        let response = Self::check(self.request(Method::GET, url).await?.send().await?).await?;
        debug!("Opened watch on {key}");

        Ok(Box::new(HttpDeploymentWatch::new(key.clone(), response)))
    }
}

/// Streaming watch over one chunked HTTP response
pub struct HttpDeploymentWatch {
    key: DeploymentKey,
    response: Option<Response>,
    decoder: WatchDecoder,
}

impl HttpDeploymentWatch {
    fn new(key: DeploymentKey, response: Response) -> Self {
        Self {
            key,
            response: Some(response),
            decoder: WatchDecoder::new(),
        }
    }
}

#[async_trait]
impl DeploymentWatch for HttpDeploymentWatch {
    async fn next_event(&mut self) -> K8sErrorResult<Option<WatchEvent>> {
        loop {
            if let Some(event) = self.decoder.next_event() {
                return event.map(Some);
            }

            let Some(response) = self.response.as_mut() else {
                return self.decoder.finish().transpose();
            };

            match response.chunk().await {
                Ok(Some(chunk)) => self.decoder.push(&chunk),
                Ok(None) => {
                    self.response = None;
                    return self.decoder.finish().transpose();
                }
                Err(e) => {
                    self.response = None;
                    return Err(K8sError::from_reqwest(e));
                }
            }
        }
    }

    fn stop(&mut self) {
        if self.response.take().is_some() {
            debug!("Closed watch on {}", self.key);
        }
    }
}
