pub mod api_client;
pub mod command_log;
pub mod config;
pub mod error;
pub mod mapper;
pub mod session_store;
pub mod wire;
