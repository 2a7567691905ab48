//! CLI command implementations
//!
//! `serve` is the long-running adapter; `invoke` is the single-invocation
//! adapter. Both build the same router, so the handler logic exists exactly
//! once. `invoke` drives its one request through the router with a tower
//! `oneshot`, the same mechanism the integration tests use.

use axum::body::Body;
use axum::http::{header, Request};
use tower::ServiceExt;

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_response, InvocationRequest, InvocationResponse};
use crate::config::ServiceConfig;
use crate::http_server::{HttpServer, HttpServerConfig};
use crate::store::ReviewStore;

/// Dispatch a parsed CLI invocation
pub fn run_command(cli: Cli) -> CliResult<()> {
    match cli.command {
        Command::Serve { port, database } => serve(port, database),
        Command::Invoke { database } => invoke(database),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_config(port: Option<u16>, database: Option<String>) -> CliResult<ServiceConfig> {
    let mut config = ServiceConfig::from_env()?;
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(database) = database {
        config.database = database;
    }
    config.validate()?;
    Ok(config)
}

/// Start the HTTP server and run until stopped
pub fn serve(port: Option<u16>, database: Option<String>) -> CliResult<()> {
    init_tracing();
    let config = load_config(port, database)?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let store = ReviewStore::open(&config.database)?;
        let server = HttpServer::with_config(store, HttpServerConfig::with_port(config.port));
        tracing::info!(addr = %server.socket_addr(), database = %config.database, "trackrate listening");
        server.start().await.map_err(CliError::from)
    })
}

/// Handle exactly one request from stdin and exit
pub fn invoke(database: Option<String>) -> CliResult<()> {
    let config = load_config(None, database)?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let store = ReviewStore::open(&config.database)?;
        let request = read_request()?;
        let response = dispatch(store, request).await?;
        write_response(&response)
    })
}

/// Drive one invocation envelope through the router and collect the result.
pub async fn dispatch(
    store: ReviewStore,
    request: InvocationRequest,
) -> CliResult<InvocationResponse> {
    let router = HttpServer::new(store).router();

    let mut uri = request.path.clone();
    if !request.query.is_empty() {
        let pairs: Vec<String> = request
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect();
        uri.push('?');
        uri.push_str(&pairs.join("&"));
    }

    let mut builder = Request::builder()
        .method(request.method.as_str())
        .uri(uri.as_str());
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    let http_request = match &request.body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(body)?)),
        None => builder.body(Body::empty()),
    }
    .map_err(|e| CliError::invalid_request(e.to_string()))?;

    let response = router
        .oneshot(http_request)
        .await
        .map_err(|e| CliError::invalid_request(e.to_string()))?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.to_string(), v.to_string()))
        })
        .collect();

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .map_err(|e| CliError::invalid_request(e.to_string()))?;

    let body = if is_json && !bytes.is_empty() {
        serde_json::from_slice(&bytes)?
    } else {
        serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
    };

    Ok(InvocationResponse {
        status,
        headers,
        body,
    })
}
