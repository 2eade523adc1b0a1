//! Request extractors with the API's lenient parsing rules

use crate::error::ApiError;
use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::http::StatusCode;
use serde_json::{Map, Value};
use sheetkeep_core::errors::{ExError, ExErrorKind};

/// JSON body read leniently
///
/// - empty body or a non-object document: `{}`
/// - malformed JSON: 400 `invalid json body`
/// - over the body limit: 413
#[derive(Debug, Clone, PartialEq)]
pub struct LenientJson(pub Value);

#[async_trait]
impl<S> FromRequest<S> for LenientJson
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            let kind = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ExErrorKind::PayloadTooLarge
            } else {
                ExErrorKind::InvalidInput
            };
            ApiError(
                ExError::new(kind)
                    .with_op("read_body")
                    .with_message(rejection.body_text()),
            )
        })?;
        parse_body(&bytes).map(LenientJson).map_err(ApiError)
    }
}

pub fn parse_body(bytes: &[u8]) -> Result<Value, ExError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    match serde_json::from_slice::<Value>(bytes) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(_) => Ok(Value::Object(Map::new())),
        Err(_) => Err(ExError::invalid_input("read_body", "invalid json body")),
    }
}

/// Integer row id from the `:id` path segment; anything else is 400 `invalid id`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let invalid = || ApiError(ExError::invalid_input("parse_path_id", "invalid id"));
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| invalid())?;
        raw.trim().parse::<i64>().map(PathId).map_err(|_| invalid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_body_leniency() {
        assert_eq!(parse_body(b"").unwrap(), json!({}));
        assert_eq!(parse_body(b"  \n").unwrap(), json!({}));
        assert_eq!(parse_body(b"[1,2]").unwrap(), json!({}));
        assert_eq!(parse_body(b"\"text\"").unwrap(), json!({}));
        assert_eq!(parse_body(br#"{"a":1}"#).unwrap(), json!({"a": 1}));

        let err = parse_body(b"{oops").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidInput);
        assert_eq!(err.message(), "invalid json body");
    }
}
