//! # Store Errors
//!
//! Error types for the review store.

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Review store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database file could not be opened
    #[error("Failed to open database at '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    /// A query against the store failed
    #[error("Database query failed: {0}")]
    Query(#[from] rusqlite::Error),
}
