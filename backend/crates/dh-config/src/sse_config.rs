use crate::{ConfigError, ConfigErrorResult, DEFAULT_GATEWAY_URL};

use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

// Heartbeat interval constraints (seconds)
pub const MIN_HEARTBEAT_INTERVAL_SECS: u64 = 1;
pub const MAX_HEARTBEAT_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_HEARTBEAT_INTERVAL_SECS: u64 = 5;

// Gateway HTTP timeout constraints (seconds)
pub const MIN_GATEWAY_TIMEOUT_SECS: u64 = 1;
pub const MAX_GATEWAY_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 5;

/// How status transitions reach subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// Per-subscriber in-process SSE streams with heartbeats
    #[default]
    Direct,
    /// External SSE gateway reached over HTTP
    Gateway,
}

impl TransportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Gateway => "gateway",
        }
    }
}

impl FromStr for TransportKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "direct" => Ok(Self::Direct),
            "gateway" => Ok(Self::Gateway),
            other => Err(ConfigError::config(format!(
                "sse.transport must be 'direct' or 'gateway', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SseConfig {
    pub transport: TransportKind,
    /// Idle interval before a heartbeat frame on direct streams
    pub heartbeat_interval_secs: u64,
    pub gateway_url: String,
    pub gateway_timeout_secs: u64,
    /// Shared secret expected on gateway callbacks in production
    pub callback_secret: Option<String>,
}

impl Default for SseConfig {
    fn default() -> Self {
        Self {
            transport: TransportKind::default(),
            heartbeat_interval_secs: DEFAULT_HEARTBEAT_INTERVAL_SECS,
            gateway_url: String::from(DEFAULT_GATEWAY_URL),
            gateway_timeout_secs: DEFAULT_GATEWAY_TIMEOUT_SECS,
            callback_secret: None,
        }
    }
}

impl SseConfig {
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    pub fn gateway_timeout(&self) -> Duration {
        Duration::from_secs(self.gateway_timeout_secs)
    }

    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.heartbeat_interval_secs < MIN_HEARTBEAT_INTERVAL_SECS
            || self.heartbeat_interval_secs > MAX_HEARTBEAT_INTERVAL_SECS
        {
            return Err(ConfigError::config(format!(
                "sse.heartbeat_interval_secs must be {}-{}, got {}",
                MIN_HEARTBEAT_INTERVAL_SECS,
                MAX_HEARTBEAT_INTERVAL_SECS,
                self.heartbeat_interval_secs
            )));
        }

        if self.transport == TransportKind::Gateway {
            if !(self.gateway_url.starts_with("http://") || self.gateway_url.starts_with("https://"))
            {
                return Err(ConfigError::config(format!(
                    "sse.gateway_url must be an http(s) URL, got '{}'",
                    self.gateway_url
                )));
            }

            if self.gateway_timeout_secs < MIN_GATEWAY_TIMEOUT_SECS
                || self.gateway_timeout_secs > MAX_GATEWAY_TIMEOUT_SECS
            {
                return Err(ConfigError::config(format!(
                    "sse.gateway_timeout_secs must be {}-{}, got {}",
                    MIN_GATEWAY_TIMEOUT_SECS, MAX_GATEWAY_TIMEOUT_SECS, self.gateway_timeout_secs
                )));
            }
        }

        Ok(())
    }
}
