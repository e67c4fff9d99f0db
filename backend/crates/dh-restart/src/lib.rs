pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod watch_guard;

pub use error::{RestartError, Result};
pub use metrics::Metrics;
pub use orchestrator::RestartOrchestrator;
pub use watch_guard::WatchGuard;

/// Status message used when a restart worker panics
pub const INTERNAL_FAILURE_MESSAGE: &str = "restart failed: internal error";

#[cfg(test)]
mod tests;
