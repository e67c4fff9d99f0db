pub mod connection_info;
pub mod outbound_event;
pub mod recipient;
pub mod stream_frame;
pub mod tab_status_update;
