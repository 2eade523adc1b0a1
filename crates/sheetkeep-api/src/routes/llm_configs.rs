//! LLM provider config CRUD

use crate::error::ApiError;
use crate::extract::{LenientJson, PathId};
use crate::state::{blocking, AppState};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use sheetkeep_core::model::LlmConfig;
use sheetkeep_engine::commands::llm_configs::{
    create_llm_config, delete_llm_config, get_llm_config, list_llm_configs, parse_llm_config,
    update_llm_config,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/llm-configs", get(list).post(create))
        .route("/llm-configs/:id", get(show).put(update).delete(remove))
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<LlmConfig>>, ApiError> {
    let db = state.db;
    Ok(Json(blocking(move || list_llm_configs(&db)).await?))
}

async fn show(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> Result<Json<LlmConfig>, ApiError> {
    let db = state.db;
    Ok(Json(blocking(move || get_llm_config(&db, id)).await?))
}

async fn create(
    State(state): State<AppState>,
    LenientJson(body): LenientJson,
) -> Result<(StatusCode, Json<LlmConfig>), ApiError> {
    let input = parse_llm_config(&body)?;
    let db = state.db;
    let created = blocking(move || create_llm_config(&db, &input)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update(
    State(state): State<AppState>,
    PathId(id): PathId,
    LenientJson(body): LenientJson,
) -> Result<Json<LlmConfig>, ApiError> {
    let input = parse_llm_config(&body)?;
    let db = state.db;
    Ok(Json(blocking(move || update_llm_config(&db, id, &input)).await?))
}

async fn remove(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> Result<StatusCode, ApiError> {
    let db = state.db;
    blocking(move || delete_llm_config(&db, id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
