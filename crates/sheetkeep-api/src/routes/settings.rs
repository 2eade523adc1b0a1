//! Active system prompt setting

use crate::error::ApiError;
use crate::extract::LenientJson;
use crate::state::{blocking, AppState};
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use sheetkeep_engine::commands::system_prompts::{active_system_prompt, set_active_system_prompt};

pub fn routes() -> Router<AppState> {
    Router::new().route("/settings/system-prompt", get(show).put(update))
}

async fn show(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let db = state.db;
    let id = blocking(move || active_system_prompt(&db)).await?;
    Ok(Json(json!({ "activeSystemPromptId": id })))
}

async fn update(
    State(state): State<AppState>,
    LenientJson(body): LenientJson,
) -> Result<Json<Value>, ApiError> {
    let db = state.db;
    let id = blocking(move || set_active_system_prompt(&db, &body)).await?;
    Ok(Json(json!({ "activeSystemPromptId": id })))
}
