//! Request metrics.

use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;

/// Record a request counter and latency histogram per route template.
pub async fn track_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    // Label by template so `/users/{id}` does not explode cardinality.
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "unmatched".to_owned(), |p| p.as_str().to_owned());
    let method = req.method().to_string();

    let response = next.run(req).await;

    let latency = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    let labels = [("method", method.clone()), ("path", path.clone())];
    metrics::histogram!("users_http_request_duration_seconds", &labels).record(latency);

    let labels = [("method", method), ("path", path), ("status", status)];
    metrics::counter!("users_http_requests_total", &labels).increment(1);

    response
}
