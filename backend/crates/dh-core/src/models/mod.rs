pub mod deployment_key;
pub mod status_payload;
pub mod status_state;
pub mod tab;
pub mod tab_binding;
