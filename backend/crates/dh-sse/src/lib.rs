pub mod connection_registry;
pub mod error;
pub mod event_bus;
pub mod gateway;
pub mod local_fanout;
pub mod metrics;
pub mod models;
pub mod shutdown_coordinator;
pub mod shutdown_guard;
pub mod status_store;
pub mod status_subscription;
pub mod status_transport;

pub use connection_registry::ConnectionRegistry;
pub use error::{Result, SseError};
pub use event_bus::EventBus;
pub use gateway::{GatewayTransport, HttpGateway, SendOutcome};
pub use local_fanout::LocalFanout;
pub use metrics::Metrics;
pub use models::connection_info::ConnectionInfo;
pub use models::outbound_event::OutboundEvent;
pub use models::recipient::Recipient;
pub use models::stream_frame::StreamFrame;
pub use models::tab_status_update::TabStatusUpdate;
pub use shutdown_coordinator::ShutdownCoordinator;
pub use shutdown_guard::ShutdownGuard;
pub use status_store::StatusStore;
pub use status_subscription::StatusSubscription;
pub use status_transport::{GatewayStatusTransport, StatusTransport};

/// Event name for status transitions sent through the gateway
pub const TAB_STATUS_EVENT: &str = "tab_status";

/// Subject bound to every connection when authentication is disabled.
/// Subject-filtered broadcasts always include it.
pub const LOCAL_USER_SUBJECT: &str = "local-user";

#[cfg(test)]
mod tests;
