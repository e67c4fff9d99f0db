use crate::{ConfigError, ConfigErrorResult};

use serde::Deserialize;

/// Orchestration API connection settings.
///
/// With no `api_server` the service-account mount and the
/// `KUBERNETES_SERVICE_HOST`/`KUBERNETES_SERVICE_PORT` variables are used.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct KubernetesConfig {
    pub api_server: Option<String>,
    pub token_path: Option<String>,
    pub ca_cert_path: Option<String>,
    pub accept_invalid_certs: bool,
}

impl KubernetesConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if let Some(ref server) = self.api_server
            && !(server.starts_with("http://") || server.starts_with("https://"))
        {
            return Err(ConfigError::config(format!(
                "kubernetes.api_server must be an http(s) URL, got {server}"
            )));
        }
        Ok(())
    }
}
