//! Error handling module.
//!
//! Request failures map onto two HTTP tiers: client errors (400) for bodies and
//! path parameters that cannot be parsed, and server errors (500) for anything
//! the store or the response encoder reports. Error bodies are plain text
//! carrying the underlying message.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Application-level error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed request body or path parameter.
    #[error("{0}")]
    BadRequest(String),

    /// Storage backend error.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Internal server error (e.g. response serialization).
    #[error("{0}")]
    Internal(String),

    /// The request did not complete before the deadline.
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

impl AppError {
    /// Get the HTTP status code for this error.
    ///
    /// A missing user is reported as a storage failure like any other.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_client_error() {
            tracing::warn!(status = %status, message = %message, "Request rejected");
        } else {
            tracing::error!(status = %status, message = %message, "Request failed");
        }

        (status, message).into_response()
    }
}

/// Storage-specific error type.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No user with the given id.
    #[error("user {0} not found")]
    NotFound(i64),

    /// Connection error.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Query execution error.
    #[error("Query failed: {0}")]
    Query(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Lock acquisition failed.
    #[error("Failed to acquire lock: {0}")]
    LockFailed(String),

    /// File I/O error.
    #[error("File I/O error: {0}")]
    FileIO(String),

    /// Backend not available.
    #[error("Storage backend unavailable")]
    Unavailable,
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::FileIO(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => Self::Unavailable,
            sqlx::Error::Io(_) | sqlx::Error::Tls(_) => Self::Connection(err.to_string()),
            other => Self::Query(other.to_string()),
        }
    }
}

impl From<deadpool_redis::PoolError> for StorageError {
    fn from(err: deadpool_redis::PoolError) -> Self {
        Self::Connection(err.to_string())
    }
}

impl From<deadpool_redis::redis::RedisError> for StorageError {
    fn from(err: deadpool_redis::redis::RedisError) -> Self {
        if err.is_connection_dropped() || err.is_connection_refusal() || err.is_timeout() {
            Self::Connection(err.to_string())
        } else {
            Self::Query(err.to_string())
        }
    }
}

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias using `StorageError`.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::BadRequest("bad".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Storage(StorageError::Unavailable).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Timeout(Duration::from_secs(15)).status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn test_not_found_is_server_error() {
        let err = AppError::from(StorageError::NotFound(7));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "user 7 not found");
    }

    #[test]
    fn test_messages_are_passed_through() {
        let parse_err = "abc".parse::<i64>().unwrap_err();
        let err = AppError::BadRequest(parse_err.to_string());
        assert_eq!(err.to_string(), "invalid digit found in string");
        assert_eq!(
            AppError::Timeout(Duration::from_secs(15)).to_string(),
            "request timed out after 15s"
        );
    }

    #[test]
    fn test_sqlx_row_not_found_maps_to_query() {
        let err = StorageError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StorageError::Query(_)));
        assert!(matches!(
            StorageError::from(sqlx::Error::PoolTimedOut),
            StorageError::Unavailable
        ));
    }

    #[tokio::test]
    async fn test_error_body_is_plain_text() {
        let response = AppError::BadRequest("expected value".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let content_type = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(content_type.starts_with("text/plain"));

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"expected value");
    }
}
