use crate::{ConfigError, ConfigErrorResult, DEFAULT_AUTH_ENABLED, DEFAULT_COOKIE_NAME};

use std::path::Path;

use serde::Deserialize;

/// Identity settings used when binding gateway connections to a subject
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub enabled: bool,
    /// HS256 shared secret
    pub jwt_secret: Option<String>,
    /// RS256 public key (PEM), relative to the config dir
    pub jwt_public_key_path: Option<String>,
    /// Cookie consulted when no bearer header is forwarded
    pub cookie_name: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: DEFAULT_AUTH_ENABLED,
            jwt_secret: None,
            jwt_public_key_path: None,
            cookie_name: String::from(DEFAULT_COOKIE_NAME),
        }
    }
}

impl AuthConfig {
    pub fn validate(&self, config_dir: &Path) -> ConfigErrorResult<()> {
        if self.cookie_name.trim().is_empty() {
            return Err(ConfigError::auth("auth.cookie_name must not be empty"));
        }

        if !self.enabled {
            return Ok(());
        }

        match (&self.jwt_secret, &self.jwt_public_key_path) {
            (Some(_), Some(_)) => Err(ConfigError::auth(
                "auth.jwt_secret and auth.jwt_public_key_path are mutually exclusive",
            )),
            (None, None) => Err(ConfigError::auth(
                "auth.enabled requires auth.jwt_secret or auth.jwt_public_key_path",
            )),
            (Some(secret), None) if secret.len() < 32 => Err(ConfigError::auth(format!(
                "auth.jwt_secret must be at least 32 bytes, got {}",
                secret.len()
            ))),
            (None, Some(key_path)) => {
                let full_path = config_dir.join(key_path);
                if !full_path.is_file() {
                    return Err(ConfigError::auth(format!(
                        "auth.jwt_public_key_path not found: {}",
                        full_path.display()
                    )));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
