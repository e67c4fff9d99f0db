pub mod callback;
pub mod config;
pub mod error;
pub mod restart;
pub mod status;
