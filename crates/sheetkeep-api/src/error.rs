//! HTTP mapping of `ExError`
//!
//! Every failure leaves the server as `{ "error": <message> }` with a status
//! derived from the error kind.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use sheetkeep_core::errors::{ExError, ExErrorKind};
use sheetkeep_core::model::PayloadError;

#[derive(Debug)]
pub struct ApiError(pub ExError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        status_for(self.0.kind())
    }
}

pub fn status_for(kind: ExErrorKind) -> StatusCode {
    match kind {
        ExErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ExErrorKind::NotFound => StatusCode::NOT_FOUND,
        ExErrorKind::AlreadyExists | ExErrorKind::Concurrency => StatusCode::CONFLICT,
        ExErrorKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        ExErrorKind::Io
        | ExErrorKind::Serialization
        | ExErrorKind::Persistence
        | ExErrorKind::Config
        | ExErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ExError> for ApiError {
    fn from(err: ExError) -> Self {
        Self(err)
    }
}

impl From<PayloadError> for ApiError {
    fn from(err: PayloadError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(
                err_code = self.0.code(),
                err = %self.0,
                "Request failed"
            );
        } else {
            tracing::debug!(err_code = self.0.code(), err = %self.0, "Request rejected");
        }
        (status, Json(json!({ "error": self.0.message() }))).into_response()
    }
}
