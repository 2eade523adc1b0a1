//! Workbook snapshot endpoints
//!
//! - `GET /workbook/latest?key=` → snapshot or `null`
//! - `POST /workbook/save` → 201 created, 200 saved, 409 conflict,
//!   400/413 rejected
//! - `DELETE /workbook/snapshot?key=` → 204

use crate::error::ApiError;
use crate::extract::LenientJson;
use crate::state::{blocking, AppState};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use sheetkeep_core::model::snapshot::resolve_query_key;
use sheetkeep_core::model::WorkbookSnapshot;
use sheetkeep_engine::commands::snapshot::{SaveOutcome, SaveRequest};

#[derive(Debug, Default, Deserialize)]
pub struct KeyQuery {
    key: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/workbook/latest", get(latest))
        .route("/workbook/save", post(save))
        .route("/workbook/snapshot", delete(remove))
}

async fn latest(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
) -> Result<Json<Option<WorkbookSnapshot>>, ApiError> {
    let service = state.snapshots;
    let key = resolve_query_key(query.key.as_deref(), service.default_key());
    let snapshot = blocking(move || service.fetch_latest(&key)).await?;
    Ok(Json(snapshot))
}

async fn save(
    State(state): State<AppState>,
    LenientJson(body): LenientJson,
) -> Result<Response, ApiError> {
    let service = state.snapshots;
    let outcome = blocking(move || {
        let request = SaveRequest::from_json(&body, service.default_key())?;
        service.save(request)
    })
    .await?;

    let response = match outcome {
        SaveOutcome::Created {
            workbook_key,
            version,
        } => (
            StatusCode::CREATED,
            Json(json!({ "ok": true, "workbookKey": workbook_key, "version": version })),
        )
            .into_response(),
        SaveOutcome::Saved {
            workbook_key,
            version,
        } => (
            StatusCode::OK,
            Json(json!({ "ok": true, "workbookKey": workbook_key, "version": version })),
        )
            .into_response(),
        SaveOutcome::Conflict {
            workbook_key,
            current_version,
        } => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "version conflict",
                "workbookKey": workbook_key,
                "currentVersion": current_version,
            })),
        )
            .into_response(),
        SaveOutcome::Rejected(reason) => ApiError::from(reason).into_response(),
    };
    Ok(response)
}

async fn remove(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
) -> Result<StatusCode, ApiError> {
    let service = state.snapshots;
    let key = resolve_query_key(query.key.as_deref(), service.default_key());
    blocking(move || service.remove(&key)).await?;
    Ok(StatusCode::NO_CONTENT)
}
