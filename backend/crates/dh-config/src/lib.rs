mod auth_config;
mod config;
mod error;
mod kubernetes_config;
mod log_level;
mod logging_config;
mod restart_config;
mod server_config;
mod sse_config;
mod tabs_config;

pub use auth_config::AuthConfig;
pub use config::Config;
pub use error::{ConfigError, ConfigErrorResult};
pub use kubernetes_config::KubernetesConfig;
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use restart_config::RestartConfig;
pub use server_config::ServerConfig;
pub use sse_config::{SseConfig, TransportKind};
pub use tabs_config::TabsConfig;

#[cfg(test)]
mod tests;

const CONFIG_DIR_ENV: &str = "DH_CONFIG_DIR";
const DEFAULT_CONFIG_DIR: &str = ".deckhand";
const CONFIG_FILENAME: &str = "config.toml";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;
const MIN_PORT: u16 = 1024;
const DEFAULT_ENVIRONMENT: &str = "development";
const PRODUCTION_ENVIRONMENT: &str = "production";

const DEFAULT_AUTH_ENABLED: bool = false;
const DEFAULT_COOKIE_NAME: &str = "access_token";

const DEFAULT_LOG_LEVEL_STRING: &str = "info";
const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
const DEFAULT_LOG_DIRECTORY: &str = "log";

const DEFAULT_TABS_PATH: &str = "tabs.toml";

const DEFAULT_GATEWAY_URL: &str = "http://localhost:3001";
