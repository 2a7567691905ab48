//! Admin HTTP Routes
//!
//! Endpoints for the full review export (JSON or CSV attachment) and the
//! aggregate analytics.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use super::server::{error_response, preflight_handler, AppState, ErrorResponse};
use crate::api::{self, AdminReviewsQuery, AnalyticsResponse, ExportPayload};

/// Create admin routes (mounted under /admin)
pub fn admin_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/reviews",
            get(export_reviews_handler).options(preflight_handler),
        )
        .route(
            "/analytics",
            get(analytics_handler).options(preflight_handler),
        )
        .with_state(state)
}

async fn export_reviews_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AdminReviewsQuery>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    match api::admin_reviews(&state.store, query)
        .await
        .map_err(error_response)?
    {
        ExportPayload::Json(body) => Ok(Json(body).into_response()),
        ExportPayload::Csv { filename, body } => Ok((
            [
                (header::CONTENT_TYPE, "text/csv".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", filename),
                ),
            ],
            body,
        )
            .into_response()),
    }
}

async fn analytics_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AnalyticsResponse>, (StatusCode, Json<ErrorResponse>)> {
    api::admin_analytics(&state.store)
        .await
        .map(Json)
        .map_err(error_response)
}
