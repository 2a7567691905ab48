//! # API Errors
//!
//! Error taxonomy for the request handlers:
//! - validation error -> 400 with a descriptive message
//! - not-found route -> 404
//! - store/unexpected error -> 500 with a generic message; the original
//!   error is only logged server-side

use thiserror::Error;

use crate::store::StoreError;

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Handler errors with an HTTP status mapping
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or invalid request field
    #[error("{0}")]
    Validation(String),

    /// No such route
    #[error("Not found")]
    NotFound,

    /// Store failure; the message never leaks the underlying error
    #[error("Internal server error")]
    Store(#[from] StoreError),

    /// Response shaping failure (CSV/UTF-8), surfaced like a store failure
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Validation(_) => 400,
            ApiError::NotFound => 404,
            ApiError::Store(_) | ApiError::Internal(_) => 500,
        }
    }

    /// Server-side detail for logging; `None` for client errors
    pub fn detail(&self) -> Option<String> {
        match self {
            ApiError::Store(source) => Some(source.to_string()),
            ApiError::Internal(detail) => Some(detail.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::validation("bad").status_code(), 400);
        assert_eq!(ApiError::NotFound.status_code(), 404);
        assert_eq!(ApiError::Internal("x".into()).status_code(), 500);
    }

    #[test]
    fn test_internal_errors_render_generic_message() {
        let err = ApiError::Internal("csv writer failed".into());
        assert_eq!(err.to_string(), "Internal server error");
        assert_eq!(err.detail().as_deref(), Some("csv writer failed"));
    }
}
