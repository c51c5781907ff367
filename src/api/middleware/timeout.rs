//! Per-request deadline.

use std::time::Duration;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;

/// Abort the request if it has not produced a response within `limit`.
///
/// The inner future (handler plus any in-flight store call) is dropped on
/// expiry and the client gets a 504.
pub async fn request_timeout(
    State(limit): State<Duration>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    if let Ok(response) = tokio::time::timeout(limit, next.run(req)).await {
        response
    } else {
        tracing::warn!(%method, %path, ?limit, "Request deadline exceeded");
        AppError::Timeout(limit).into_response()
    }
}
