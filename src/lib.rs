//! trackrate - a small self-hostable review service for audio items

pub mod api;
pub mod cli;
pub mod config;
pub mod http_server;
pub mod store;
