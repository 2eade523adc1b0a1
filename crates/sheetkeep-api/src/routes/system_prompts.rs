//! System prompt CRUD

use crate::error::ApiError;
use crate::extract::{LenientJson, PathId};
use crate::state::{blocking, AppState};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use sheetkeep_core::model::SystemPrompt;
use sheetkeep_engine::commands::system_prompts::{
    create_system_prompt, delete_system_prompt, get_system_prompt, list_system_prompts,
    parse_system_prompt, update_system_prompt,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/system-prompts", get(list).post(create))
        .route("/system-prompts/:id", get(show).put(update).delete(remove))
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<SystemPrompt>>, ApiError> {
    let db = state.db;
    Ok(Json(blocking(move || list_system_prompts(&db)).await?))
}

async fn show(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> Result<Json<SystemPrompt>, ApiError> {
    let db = state.db;
    Ok(Json(blocking(move || get_system_prompt(&db, id)).await?))
}

async fn create(
    State(state): State<AppState>,
    LenientJson(body): LenientJson,
) -> Result<(StatusCode, Json<SystemPrompt>), ApiError> {
    let input = parse_system_prompt(&body)?;
    let db = state.db;
    let created = blocking(move || create_system_prompt(&db, &input)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update(
    State(state): State<AppState>,
    PathId(id): PathId,
    LenientJson(body): LenientJson,
) -> Result<Json<SystemPrompt>, ApiError> {
    let input = parse_system_prompt(&body)?;
    let db = state.db;
    Ok(Json(
        blocking(move || update_system_prompt(&db, id, &input)).await?,
    ))
}

async fn remove(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> Result<StatusCode, ApiError> {
    let db = state.db;
    blocking(move || delete_system_prompt(&db, id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
