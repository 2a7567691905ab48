//! # Review Store
//!
//! SQLite-backed persistence for review records. One row per
//! (session_id, audio_id) pair, enforced by a UNIQUE constraint and written
//! through an atomic upsert, so concurrent submissions for the same pair can
//! never produce duplicate rows.
//!
//! The connection is shared behind an async mutex; every method takes the
//! lock only for the duration of its own statements.

pub mod errors;

pub use errors::{StoreError, StoreResult};

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, Row};
use tokio::sync::Mutex;

/// Fields accepted for a new or updated review
#[derive(Debug, Clone)]
pub struct NewReview {
    pub audio_id: i64,
    pub title: String,
    pub rating: f64,
    pub timestamp: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub user_agent: Option<String>,
    pub session_id: String,
    pub ip_address: Option<String>,
}

/// A persisted review row
#[derive(Debug, Clone)]
pub struct ReviewRow {
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

/// One page of reviews plus the total row count across all pages
#[derive(Debug)]
pub struct ReviewPage {
    pub rows: Vec<ReviewRow>,
    pub total: u64,
}

/// Whole-table aggregates, each computed in a single pass
#[derive(Debug)]
pub struct AnalyticsSummary {
    pub total_reviews: u64,
    pub average_rating: f64,
    pub unique_sessions: u64,
    pub unique_audio_items: u64,
    pub first_review_at: Option<String>,
    pub last_review_at: Option<String>,
}

/// Histogram bucket for ratings, keyed by integer floor of the rating
#[derive(Debug)]
pub struct RatingBucket {
    pub rating: i64,
    pub count: u64,
}

/// Per-audio-item review statistics
#[derive(Debug)]
pub struct AudioStat {
    pub audio_id: i64,
    pub title: String,
    pub review_count: u64,
    pub average_rating: f64,
}

const SELECT_COLUMNS: &str = "id, audio_id, title, rating, timestamp, date, \
     time, user_agent, session_id, ip_address, created_at, updated_at";

/// SQLite-backed review store
#[derive(Clone)]
pub struct ReviewStore {
    conn: Arc<Mutex<Connection>>,
}

impl ReviewStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    ///
    /// `:memory:` is accepted for an ephemeral store.
    pub fn open(path: &str) -> StoreResult<Self> {
        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.to_string(),
            source,
        })?;
        Self::create_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create the reviews table and its indexes. Idempotent.
    fn create_schema(conn: &Connection) -> StoreResult<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS reviews (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                audio_id    INTEGER NOT NULL,
                title       TEXT NOT NULL,
                rating      REAL NOT NULL,
                timestamp   TEXT,
                date        TEXT,
                time        TEXT,
                user_agent  TEXT,
                session_id  TEXT NOT NULL,
                ip_address  TEXT,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL,
                UNIQUE (session_id, audio_id)
            );
            CREATE INDEX IF NOT EXISTS idx_reviews_session_id ON reviews (session_id);
            CREATE INDEX IF NOT EXISTS idx_reviews_audio_id ON reviews (audio_id);
            CREATE INDEX IF NOT EXISTS idx_reviews_created_at ON reviews (created_at);",
        )?;
        Ok(())
    }

    /// Insert a review, or update the existing row for the same
    /// (session_id, audio_id) pair. Returns the row id either way.
    ///
    /// The upsert is a single statement, so the one-row-per-pair invariant
    /// holds even under concurrent submissions.
    pub async fn upsert_review(&self, review: &NewReview) -> StoreResult<i64> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let conn = self.conn.lock().await;

        let id = conn.query_row(
            "INSERT INTO reviews (audio_id, title, rating, timestamp, date, time,
                                  user_agent, session_id, ip_address, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
             ON CONFLICT (session_id, audio_id) DO UPDATE SET
                 title = excluded.title,
                 rating = excluded.rating,
                 timestamp = excluded.timestamp,
                 date = excluded.date,
                 time = excluded.time,
                 user_agent = excluded.user_agent,
                 ip_address = excluded.ip_address,
                 updated_at = excluded.updated_at
             RETURNING id",
            params![
                review.audio_id,
                review.title,
                review.rating,
                review.timestamp,
                review.date,
                review.time,
                review.user_agent,
                review.session_id,
                review.ip_address,
                now,
            ],
            |row| row.get(0),
        )?;

        Ok(id)
    }

    /// All reviews for one session, newest first.
    pub async fn reviews_for_session(&self, session_id: &str) -> StoreResult<Vec<ReviewRow>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM reviews
             WHERE session_id = ?1
             ORDER BY created_at DESC, id DESC"
        ))?;
        let rows = stmt
            .query_map(params![session_id], row_to_review)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// One page of all reviews, newest first, plus the total row count.
    ///
    /// The total rides along as a window count; when the requested page is
    /// past the end of the table it falls back to a plain COUNT(*).
    pub async fn page(&self, limit: u64, offset: u64) -> StoreResult<ReviewPage> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS}, COUNT(*) OVER () AS total FROM reviews
             ORDER BY created_at DESC, id DESC
             LIMIT ?1 OFFSET ?2"
        ))?;

        let mut total: u64 = 0;
        let rows = stmt
            .query_map(params![limit as i64, offset as i64], |row| {
                total = row.get::<_, i64>(12)? as u64;
                row_to_review(row)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        if rows.is_empty() {
            total = conn.query_row("SELECT COUNT(*) FROM reviews", [], |row| {
                row.get::<_, i64>(0)
            })? as u64;
        }

        Ok(ReviewPage { rows, total })
    }

    /// Count, average rating, distinct sessions/items and first/last
    /// created_at, in one statement.
    pub async fn analytics_summary(&self) -> StoreResult<AnalyticsSummary> {
        let conn = self.conn.lock().await;

        let summary = conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(AVG(rating), 0),
                    COUNT(DISTINCT session_id),
                    COUNT(DISTINCT audio_id),
                    MIN(created_at),
                    MAX(created_at)
             FROM reviews",
            [],
            |row| {
                Ok(AnalyticsSummary {
                    total_reviews: row.get::<_, i64>(0)? as u64,
                    average_rating: row.get(1)?,
                    unique_sessions: row.get::<_, i64>(2)? as u64,
                    unique_audio_items: row.get::<_, i64>(3)? as u64,
                    first_review_at: row.get(4)?,
                    last_review_at: row.get(5)?,
                })
            },
        )?;

        Ok(summary)
    }

    /// Rating histogram bucketed by integer floor of the rating, ascending.
    ///
    /// Ratings are constrained to [0, 5], so CAST truncation and floor agree.
    pub async fn rating_distribution(&self) -> StoreResult<Vec<RatingBucket>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare(
            "SELECT CAST(rating AS INTEGER) AS bucket, COUNT(*)
             FROM reviews
             GROUP BY bucket
             ORDER BY bucket ASC",
        )?;
        let buckets = stmt
            .query_map([], |row| {
                Ok(RatingBucket {
                    rating: row.get(0)?,
                    count: row.get::<_, i64>(1)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(buckets)
    }

    /// Review count and average rating per (audio_id, title) pair, ordered
    /// by review count descending.
    pub async fn audio_stats(&self) -> StoreResult<Vec<AudioStat>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare(
            "SELECT audio_id, title, COUNT(*) AS review_count, AVG(rating)
             FROM reviews
             GROUP BY audio_id, title
             ORDER BY review_count DESC, audio_id ASC",
        )?;
        let stats = stmt
            .query_map([], |row| {
                Ok(AudioStat {
                    audio_id: row.get(0)?,
                    title: row.get(1)?,
                    review_count: row.get::<_, i64>(2)? as u64,
                    average_rating: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(stats)
    }
}

fn row_to_review(row: &Row<'_>) -> rusqlite::Result<ReviewRow> {
    Ok(ReviewRow {
        id: row.get(0)?,
        audio_id: row.get(1)?,
        title: row.get(2)?,
        rating: row.get(3)?,
        timestamp: row.get(4)?,
        date: row.get(5)?,
        time: row.get(6)?,
        user_agent: row.get(7)?,
        session_id: row.get(8)?,
        ip_address: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}
