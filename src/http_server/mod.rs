//! # HTTP Server Module
//!
//! The long-running hosting adapter: an axum server mapping the HTTP
//! surface onto the pure handlers in [`crate::api`].
//!
//! # Endpoints
//!
//! - `GET /health` - Health check
//! - `GET|POST /reviews` - Submit/update and list session reviews
//! - `GET /admin/reviews` - Paged export (JSON or CSV)
//! - `GET /admin/analytics` - Aggregate statistics

pub mod admin_routes;
pub mod config;
pub mod review_routes;
pub mod server;

pub use config::HttpServerConfig;
pub use server::HttpServer;
