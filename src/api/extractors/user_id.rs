//! `{id}` path parameter extractor.

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use crate::error::AppError;

/// User id parsed from the `{id}` path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub i64);

impl UserId {
    fn parse(raw: &str) -> Result<Self, AppError> {
        raw.parse()
            .map(Self)
            .map_err(|e| AppError::BadRequest(format!("invalid user id {raw:?}: {e}")))
    }
}

impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        Self::parse(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(UserId::parse("42").unwrap(), UserId(42));
        assert_eq!(UserId::parse("-1").unwrap(), UserId(-1));
        assert!(UserId::parse("abc").is_err());
        assert!(UserId::parse("1.5").is_err());
        assert!(UserId::parse("99999999999999999999").is_err());
    }

    #[test]
    fn test_error_carries_parse_message() {
        let err = UserId::parse("abc").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid user id \"abc\": invalid digit found in string"
        );
    }
}
