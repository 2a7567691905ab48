//! # HTTP Server
//!
//! Main HTTP server combining the review and admin routers.
//!
//! Every response carries permissive CORS headers; a bare `OPTIONS` to any
//! path gets an empty 200, and unmatched routes get a JSON 404. The router
//! is also exposed standalone so the single-invocation adapter and the
//! tests can drive requests through it without binding a socket.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::admin_routes::admin_routes;
use super::config::HttpServerConfig;
use super::review_routes::review_routes;
use crate::api::ApiError;
use crate::store::ReviewStore;

/// State shared across handlers
pub struct AppState {
    pub store: ReviewStore,
}

/// Error body shape shared by all routes
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Map a handler error onto its wire representation. Client errors carry
/// their own message; store failures are logged and render generically.
pub(crate) fn error_response(err: ApiError) -> (StatusCode, Json<ErrorResponse>) {
    if let Some(detail) = err.detail() {
        tracing::error!(error = %detail, "request failed");
    }
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse {
        error: err.to_string(),
    }))
}

/// Answer for a bare OPTIONS request (the CORS layer adds the headers)
pub(crate) async fn preflight_handler() -> StatusCode {
    StatusCode::OK
}

/// HTTP server for the review service
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with default configuration
    pub fn new(store: ReviewStore) -> Self {
        Self::with_config(store, HttpServerConfig::default())
    }

    /// Create a new HTTP server with custom configuration
    pub fn with_config(store: ReviewStore, config: HttpServerConfig) -> Self {
        let router = Self::build_router(store);
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    fn build_router(store: ReviewStore) -> Router {
        let state = Arc::new(AppState { store });

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE]);

        Router::new()
            .route("/health", get(health_handler).options(preflight_handler))
            .merge(review_routes(state.clone()))
            .nest("/admin", admin_routes(state))
            .fallback(fallback_handler)
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for the single-invocation adapter and tests)
    pub fn router(self) -> Router {
        self.router
    }

    /// Start the HTTP server (async)
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self
            .config
            .socket_addr()
            .parse()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        let listener = TcpListener::bind(addr).await?;
        axum::serve(
            listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
    }
}

/// Health check handler
async fn health_handler() -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (StatusCode::OK, Json(response))
}

/// Bare OPTIONS anywhere gets a 200; everything else unmatched is a 404.
async fn fallback_handler(method: Method) -> Response {
    if method == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Not found".to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_mapping() {
        let (status, body) = error_response(ApiError::validation("Missing required field: title"));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Missing required field: title");

        let (status, body) = error_response(ApiError::Internal("boom".to_string()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Internal server error");
    }
}
