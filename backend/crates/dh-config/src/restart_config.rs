use crate::{ConfigError, ConfigErrorResult};

use std::time::Duration;

use serde::Deserialize;

pub const MIN_RESTART_TIMEOUT_SECS: u64 = 1;
pub const MAX_RESTART_TIMEOUT_SECS: u64 = 3600;
pub const DEFAULT_RESTART_TIMEOUT_SECS: u64 = 180;

pub const MAX_DRAIN_TIMEOUT_SECS: u64 = 600;
pub const DEFAULT_DRAIN_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RestartConfig {
    /// Upper bound on one rollout watch
    pub timeout_secs: u64,
    /// How long shutdown waits for in-flight restarts to report
    pub drain_timeout_secs: u64,
}

impl Default for RestartConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_RESTART_TIMEOUT_SECS,
            drain_timeout_secs: DEFAULT_DRAIN_TIMEOUT_SECS,
        }
    }
}

impl RestartConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.drain_timeout_secs)
    }

    pub fn validate(&self) -> ConfigErrorResult<()> {
        if !(MIN_RESTART_TIMEOUT_SECS..=MAX_RESTART_TIMEOUT_SECS).contains(&self.timeout_secs) {
            return Err(ConfigError::config(format!(
                "restart.timeout_secs must be {}-{}, got {}",
                MIN_RESTART_TIMEOUT_SECS, MAX_RESTART_TIMEOUT_SECS, self.timeout_secs
            )));
        }

        if self.drain_timeout_secs > MAX_DRAIN_TIMEOUT_SECS {
            return Err(ConfigError::config(format!(
                "restart.drain_timeout_secs must be at most {}, got {}",
                MAX_DRAIN_TIMEOUT_SECS, self.drain_timeout_secs
            )));
        }

        Ok(())
    }
}
