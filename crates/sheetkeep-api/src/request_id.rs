//! Per-request correlation id
//!
//! Reuses a well-formed `x-request-id` from the client, otherwise mints a
//! UUIDv7. The id is stored in request extensions, recorded on a tracing
//! span around the handler and echoed on the response.

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use sheetkeep_core::types::{RequestId, REQUEST_ID_HEADER};
use tracing::Instrument;

pub async fn propagate_request_id(mut req: Request, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(RequestId::from_header_value)
        .unwrap_or_default();

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    );
    req.extensions_mut().insert(request_id.clone());

    let mut response = next.run(req).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
