pub mod api_status;
pub mod deployment;
pub mod watch_event;
