//! Response writing.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::error::Result;

/// Serialize `body` as JSON with the given status.
///
/// `Content-Type: application/json` is only set here, never on empty
/// responses. An encoding failure becomes a 500 carrying the serde message.
pub fn json<T: Serialize>(status: StatusCode, body: &T) -> Result<Response> {
    let bytes = serde_json::to_vec(body)?;

    Ok((
        status,
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        )],
        bytes,
    )
        .into_response())
}

/// A status-only response with an empty body.
pub fn empty(status: StatusCode) -> Response {
    status.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_sets_content_type() {
        let response = json(StatusCode::CREATED, &serde_json::json!({"id": 1})).unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn test_empty_has_no_content_type() {
        let response = empty(StatusCode::OK);
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());
    }
}
