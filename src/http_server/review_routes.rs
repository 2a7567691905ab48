//! Review HTTP Routes
//!
//! Endpoints for submitting/updating a review and listing a session's
//! reviews. The handlers here only extract transport-level inputs (query,
//! body, client address); validation lives in [`crate::api`].

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Query, State},
    extract::rejection::JsonRejection,
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::server::{error_response, preflight_handler, AppState, ErrorResponse};
use crate::api::{
    self, ApiError, SessionReviewsResponse, SubmitReviewRequest, SubmitReviewResponse,
};

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    #[serde(default, rename = "sessionId")]
    pub session_id: Option<String>,
}

/// Create review routes
pub fn review_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/reviews",
            get(session_reviews_handler)
                .post(submit_review_handler)
                .options(preflight_handler),
        )
        .with_state(state)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

async fn session_reviews_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<SessionReviewsResponse>, (StatusCode, Json<ErrorResponse>)> {
    api::session_reviews(&state.store, query.session_id.as_deref())
        .await
        .map(Json)
        .map_err(error_response)
}

async fn submit_review_handler(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Result<Json<SubmitReviewRequest>, JsonRejection>,
) -> Result<Json<SubmitReviewResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Json(request) = body.map_err(|rejection| {
        error_response(ApiError::validation(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    })?;

    let remote = connect_info.map(|ConnectInfo(addr)| addr.ip().to_string());
    let client_ip = api::client_ip(
        header_str(&headers, "x-forwarded-for"),
        header_str(&headers, "x-real-ip"),
        remote.as_deref(),
    );

    api::submit_review(&state.store, request, client_ip)
        .await
        .map(Json)
        .map_err(error_response)
}
