use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Config error: {0}")]
    Config(#[from] dh_config::ConfigError),

    #[error("Failed to read JWT key file {path}: {source}")]
    JwtKeyFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Auth error: {0}")]
    Auth(#[from] dh_auth::AuthError),

    #[error("Kubernetes client error: {0}")]
    Kubernetes(#[from] dh_k8s::K8sError),

    #[error("Status delivery error: {0}")]
    Sse(#[from] dh_sse::SseError),

    #[error("Logger error: {message}")]
    Logger { message: String },

    #[error("Metrics exporter error: {message}")]
    Metrics { message: String },
}

pub type Result<T> = std::result::Result<T, ServerError>;
