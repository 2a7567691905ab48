//! # Request Handlers
//!
//! The four operations of the service, expressed once as pure
//! request -> response functions over the review store. Transport adapters
//! (the axum server and the single-invocation CLI) only extract inputs and
//! serialize outputs; all validation and shaping lives here.

pub mod csv;
pub mod errors;

pub use errors::{ApiError, ApiResult};

use serde::{Deserialize, Serialize};

use crate::store::{NewReview, ReviewRow, ReviewStore};

// ==================
// Request/Response Types
// ==================

/// Body of `POST /reviews`. Every field optional at the serde level so
/// missing fields produce a descriptive 400 instead of a decode rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReviewRequest {
    #[serde(default)]
    pub audio_id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitReviewResponse {
    pub success: bool,
    pub id: i64,
}

/// Public shape of a review as seen by its own session
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReview {
    pub id: i64,
    pub audio_id: i64,
    pub title: String,
    pub rating: f64,
    pub timestamp: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub session_id: String,
    pub created_at: String,
}

impl From<ReviewRow> for SessionReview {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: row.id,
            audio_id: row.audio_id,
            title: row.title,
            rating: row.rating,
            timestamp: row.timestamp,
            date: row.date,
            time: row.time,
            session_id: row.session_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionReviewsResponse {
    pub success: bool,
    pub reviews: Vec<SessionReview>,
}

/// Query of `GET /admin/reviews`
#[derive(Debug, Clone, Deserialize)]
pub struct AdminReviewsQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
    #[serde(default)]
    pub format: Option<String>,
}

impl Default for AdminReviewsQuery {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
            format: None,
        }
    }
}

fn default_limit() -> u64 {
    1000
}

/// Export format; anything other than `csv` falls back to JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.eq_ignore_ascii_case("csv") => ExportFormat::Csv,
            _ => ExportFormat::Json,
        }
    }
}

/// Full row shape for the admin export
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminReview {
    pub id: i64,
    pub audio_id: i64,
    pub title: String,
    pub rating: f64,
    pub timestamp: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub user_agent: Option<String>,
    pub session_id: String,
    pub ip_address: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ReviewRow> for AdminReview {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: row.id,
            audio_id: row.audio_id,
            title: row.title,
            rating: row.rating,
            timestamp: row.timestamp,
            date: row.date,
            time: row.time,
            user_agent: row.user_agent,
            session_id: row.session_id,
            ip_address: row.ip_address,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdminReviewsResponse {
    pub success: bool,
    pub reviews: Vec<AdminReview>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

/// Result of the export operation; the adapter decides how to serialize
#[derive(Debug)]
pub enum ExportPayload {
    Json(AdminReviewsResponse),
    Csv { filename: String, body: String },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingBucketEntry {
    pub rating: i64,
    pub count: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioStatEntry {
    pub audio_id: i64,
    pub title: String,
    pub review_count: u64,
    pub average_rating: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub success: bool,
    pub total_reviews: u64,
    pub average_rating: String,
    pub unique_sessions: u64,
    pub unique_audio_items: u64,
    pub first_review_at: Option<String>,
    pub last_review_at: Option<String>,
    pub rating_distribution: Vec<RatingBucketEntry>,
    pub audio_stats: Vec<AudioStatEntry>,
}

// ==================
// Helper Functions
// ==================

/// Maximum accepted title length, matching the persisted column
const MAX_TITLE_LEN: usize = 500;

/// Resolve the client IP: first element of the forwarded-for header, then
/// the real-ip header, then the connection's remote address, else "unknown".
pub fn client_ip(
    forwarded_for: Option<&str>,
    real_ip: Option<&str>,
    remote_addr: Option<&str>,
) -> String {
    if let Some(chain) = forwarded_for {
        if let Some(first) = chain.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    if let Some(ip) = real_ip {
        if !ip.trim().is_empty() {
            return ip.trim().to_string();
        }
    }
    if let Some(addr) = remote_addr {
        if !addr.is_empty() {
            return addr.to_string();
        }
    }
    "unknown".to_string()
}

/// Averages are reported as text with two decimal places
fn format_rating(value: f64) -> String {
    format!("{:.2}", value)
}

// ==================
// Handlers
// ==================

/// Submit/update a review (upsert keyed by session + audio item).
pub async fn submit_review(
    store: &ReviewStore,
    request: SubmitReviewRequest,
    client_ip: String,
) -> ApiResult<SubmitReviewResponse> {
    let audio_id = request
        .audio_id
        .ok_or_else(|| ApiError::validation("Missing required field: audioId"))?;
    let title = request
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::validation("Missing required field: title"))?;
    let rating = request
        .rating
        .ok_or_else(|| ApiError::validation("Missing required field: rating"))?;
    let session_id = request
        .session_id
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::validation("Missing required field: sessionId"))?;

    if !(0.0..=5.0).contains(&rating) || !rating.is_finite() {
        return Err(ApiError::validation("Rating must be between 0 and 5"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ApiError::validation("Title must be at most 500 characters"));
    }

    let id = store
        .upsert_review(&NewReview {
            audio_id,
            title,
            rating,
            timestamp: request.timestamp,
            date: request.date,
            time: request.time,
            user_agent: request.user_agent,
            session_id,
            ip_address: Some(client_ip),
        })
        .await?;

    Ok(SubmitReviewResponse { success: true, id })
}

/// List all reviews for one session, newest first.
pub async fn session_reviews(
    store: &ReviewStore,
    session_id: Option<&str>,
) -> ApiResult<SessionReviewsResponse> {
    let session_id = match session_id {
        Some(s) if !s.trim().is_empty() => s,
        _ => return Err(ApiError::validation("Missing required parameter: sessionId")),
    };

    let rows = store.reviews_for_session(session_id).await?;

    Ok(SessionReviewsResponse {
        success: true,
        reviews: rows.into_iter().map(SessionReview::from).collect(),
    })
}

/// Admin list/export: one page of all reviews plus the total count, as JSON
/// or CSV.
pub async fn admin_reviews(
    store: &ReviewStore,
    query: AdminReviewsQuery,
) -> ApiResult<ExportPayload> {
    let page = store.page(query.limit, query.offset).await?;

    match ExportFormat::parse(query.format.as_deref()) {
        ExportFormat::Csv => Ok(ExportPayload::Csv {
            filename: csv::attachment_filename(),
            body: csv::render_export(&page.rows)?,
        }),
        ExportFormat::Json => Ok(ExportPayload::Json(AdminReviewsResponse {
            success: true,
            reviews: page.rows.into_iter().map(AdminReview::from).collect(),
            total: page.total,
            limit: query.limit,
            offset: query.offset,
        })),
    }
}

/// Admin analytics: whole-table aggregates, rating histogram and per-item
/// statistics.
pub async fn admin_analytics(store: &ReviewStore) -> ApiResult<AnalyticsResponse> {
    let summary = store.analytics_summary().await?;
    let distribution = store.rating_distribution().await?;
    let audio_stats = store.audio_stats().await?;

    Ok(AnalyticsResponse {
        success: true,
        total_reviews: summary.total_reviews,
        average_rating: format_rating(summary.average_rating),
        unique_sessions: summary.unique_sessions,
        unique_audio_items: summary.unique_audio_items,
        first_review_at: summary.first_review_at,
        last_review_at: summary.last_review_at,
        rating_distribution: distribution
            .into_iter()
            .map(|b| RatingBucketEntry {
                rating: b.rating,
                count: b.count,
            })
            .collect(),
        audio_stats: audio_stats
            .into_iter()
            .map(|s| AudioStatEntry {
                audio_id: s.audio_id,
                title: s.title,
                review_count: s.review_count,
                average_rating: format_rating(s.average_rating),
            })
            .collect(),
    })
}
