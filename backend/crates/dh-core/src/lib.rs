pub mod error;
pub mod models;
pub mod tab_catalog;

pub use error::{CoreError, Result};
pub use models::deployment_key::DeploymentKey;
pub use models::status_payload::StatusPayload;
pub use models::status_state::StatusState;
pub use models::tab::Tab;
pub use models::tab_binding::TabBinding;
pub use tab_catalog::TabCatalog;

#[cfg(test)]
mod tests;
