pub mod api;
pub mod app_state;
pub mod cli;
pub mod error;
pub mod health;
pub mod logger;
pub mod routes;

#[cfg(test)]
mod tests;

pub use api::{
    callback::{CallbackRequest, ForwardedRequest, gateway_callback},
    config::{ConfigResponse, TabDto, get_config},
    error::ApiError,
    error::Result as ApiResult,
    restart::{RestartResponse, restart_tab},
    status::{get_status, stream_status},
};
pub use app_state::{ApiSettings, AppState, Services};
pub use cli::Cli;
pub use error::{Result as ServerResult, ServerError};

pub use crate::routes::build_router;
