use crate::{
    AuthConfig, CONFIG_DIR_ENV, CONFIG_FILENAME, ConfigError, ConfigErrorResult,
    DEFAULT_CONFIG_DIR, KubernetesConfig, LoggingConfig, RestartConfig, ServerConfig, SseConfig,
    TabsConfig, TransportKind,
};

use std::path::{Path, PathBuf};

use dh_core::TabCatalog;
use log::{info, warn};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
    pub restart: RestartConfig,
    pub kubernetes: KubernetesConfig,
    pub sse: SseConfig,
    pub tabs: TabsConfig,
}

impl Config {
    /// Load config.
    ///
    /// Loading order:
    /// 1. Check for DH_CONFIG_DIR env var, else use ./.deckhand/
    /// 2. Auto-create config directory if it doesn't exist
    /// 3. Load config.toml if it exists, else use defaults
    /// 4. Apply DH_* environment variable overrides
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load() -> ConfigErrorResult<Self> {
        let config_dir = Self::config_dir()?;
        Self::load_from(&config_dir)
    }

    /// Same as [`Config::load`] with an explicit config directory.
    pub fn load_from(config_dir: &Path) -> ConfigErrorResult<Self> {
        if !config_dir.exists() {
            std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::Io {
                path: config_dir.to_path_buf(),
                source: e,
            })?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    fn load_toml(path: &PathBuf) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.clone(),
            source: e,
        })
    }

    /// Get the config directory.
    /// Priority: DH_CONFIG_DIR env var > ./.deckhand/ (relative to cwd)
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let cwd = std::env::current_dir()
            .map_err(|_| ConfigError::config("Cannot determine current working directory"))?;
        Ok(cwd.join(DEFAULT_CONFIG_DIR))
    }

    /// Validate all configuration.
    /// Call after load() to catch all errors at startup.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        let config_dir = Self::config_dir()?;
        self.validate_in(&config_dir)
    }

    pub fn validate_in(&self, config_dir: &Path) -> ConfigErrorResult<()> {
        self.server.validate()?;
        self.auth.validate(config_dir)?;
        self.restart.validate()?;
        self.kubernetes.validate()?;
        self.sse.validate()?;

        if self.tabs.path.trim().is_empty() {
            return Err(ConfigError::tabs("tabs.path must not be empty"));
        }

        Ok(())
    }

    /// Load the tabs file referenced by `[tabs]`.
    pub fn load_tabs(&self, config_dir: &Path) -> ConfigErrorResult<TabCatalog> {
        self.tabs.load_catalog(config_dir)
    }

    /// Get bind address as string.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Log configuration summary (NEVER logs secrets).
    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!(
            "  server: {}:{} ({})",
            self.server.host, self.server.port, self.server.environment
        );

        info!(
            "  logging: {} (colored: {})",
            *self.logging.level, self.logging.colored
        );

        let auth_type = if self.auth.jwt_secret.is_some() {
            "HS256"
        } else if self.auth.jwt_public_key_path.is_some() {
            "RS256"
        } else {
            "none"
        };
        info!(
            "  auth: {} ({}, cookie={})",
            if self.auth.enabled {
                "enabled"
            } else {
                "disabled"
            },
            auth_type,
            self.auth.cookie_name
        );

        info!(
            "  restart: timeout={}s, drain={}s",
            self.restart.timeout_secs, self.restart.drain_timeout_secs
        );

        info!(
            "  kubernetes: {}",
            self.kubernetes
                .api_server
                .as_deref()
                .unwrap_or("in-cluster service account")
        );

        match self.sse.transport {
            TransportKind::Direct => info!(
                "  sse: direct (heartbeat={}s)",
                self.sse.heartbeat_interval_secs
            ),
            TransportKind::Gateway => info!(
                "  sse: gateway {} (timeout={}s, callback secret {})",
                self.sse.gateway_url,
                self.sse.gateway_timeout_secs,
                if self.sse.callback_secret.is_some() {
                    "set"
                } else {
                    "unset"
                }
            ),
        }

        if self.server.is_production()
            && self.sse.transport == TransportKind::Gateway
            && self.sse.callback_secret.is_none()
        {
            warn!("  sse: no callback secret configured; gateway callbacks will be rejected");
        }

        info!("  tabs: {}", self.tabs.path);
    }

    fn apply_env_overrides(&mut self) {
        // Server
        Self::apply_env_string("DH_SERVER_HOST", &mut self.server.host);
        Self::apply_env_parse("DH_SERVER_PORT", &mut self.server.port);
        Self::apply_env_string("DH_ENVIRONMENT", &mut self.server.environment);

        // Logging
        Self::apply_env_parse("DH_LOG_LEVEL", &mut self.logging.level);
        Self::apply_env_bool("DH_LOG_COLORED", &mut self.logging.colored);
        Self::apply_env_option_string("DH_LOG_FILE", &mut self.logging.file);

        // Auth
        Self::apply_env_bool("DH_AUTH_ENABLED", &mut self.auth.enabled);
        Self::apply_env_option_string("DH_AUTH_JWT_SECRET", &mut self.auth.jwt_secret);
        Self::apply_env_option_string(
            "DH_AUTH_JWT_PUBLIC_KEY_PATH",
            &mut self.auth.jwt_public_key_path,
        );
        Self::apply_env_string("DH_AUTH_COOKIE_NAME", &mut self.auth.cookie_name);

        // Restart
        Self::apply_env_parse("DH_RESTART_TIMEOUT_SECS", &mut self.restart.timeout_secs);
        Self::apply_env_parse(
            "DH_RESTART_DRAIN_TIMEOUT_SECS",
            &mut self.restart.drain_timeout_secs,
        );

        // Kubernetes
        Self::apply_env_option_string("DH_K8S_API_SERVER", &mut self.kubernetes.api_server);

        // SSE
        Self::apply_env_parse("DH_SSE_TRANSPORT", &mut self.sse.transport);
        Self::apply_env_parse(
            "DH_SSE_HEARTBEAT_INTERVAL_SECS",
            &mut self.sse.heartbeat_interval_secs,
        );
        Self::apply_env_string("DH_SSE_GATEWAY_URL", &mut self.sse.gateway_url);
        Self::apply_env_parse(
            "DH_SSE_GATEWAY_TIMEOUT_SECS",
            &mut self.sse.gateway_timeout_secs,
        );
        Self::apply_env_option_string("DH_SSE_CALLBACK_SECRET", &mut self.sse.callback_secret);

        // Tabs
        Self::apply_env_string("DH_TABS_PATH", &mut self.tabs.path);
    }

    /// Helper: Apply environment variable override for String values
    fn apply_env_string(var_name: &str, target: &mut String) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val;
        }
    }

    /// Helper: Apply environment variable override for bool values (accepts "true"/"1")
    fn apply_env_bool(var_name: &str, target: &mut bool) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val == "true" || val == "1";
        }
    }

    /// Helper: Apply environment variable override for parseable values
    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.parse()
        {
            *target = parsed;
        }
    }

    /// Helper: Apply environment variable override for Option<String> values.
    /// An empty value clears the option.
    fn apply_env_option_string(var_name: &str, target: &mut Option<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = if val.is_empty() { None } else { Some(val) };
        }
    }
}
