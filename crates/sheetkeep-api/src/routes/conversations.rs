//! Conversation endpoints

use crate::error::ApiError;
use crate::extract::{LenientJson, PathId};
use crate::state::{blocking, AppState};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use sheetkeep_core::model::coerce::json_text;
use sheetkeep_core::model::Conversation;
use sheetkeep_engine::commands::conversations::{
    clear_conversations, conversation_thread, create_conversation, delete_conversation,
    list_conversations, recent_conversation, save_conversation, ConversationSave,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/conversations", get(list).post(create).delete(clear))
        .route("/conversations/recent", get(recent))
        .route("/conversations/:id", axum::routing::delete(remove))
        .route("/conversations/:id/messages", get(messages))
        .route("/conversations/:id/save", post(save))
}

async fn recent(State(state): State<AppState>) -> Result<Json<Option<Conversation>>, ApiError> {
    let db = state.db;
    Ok(Json(blocking(move || recent_conversation(&db)).await?))
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<Conversation>>, ApiError> {
    let db = state.db;
    Ok(Json(blocking(move || list_conversations(&db)).await?))
}

async fn messages(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> Result<Json<Value>, ApiError> {
    let db = state.db;
    let thread = blocking(move || conversation_thread(&db, id)).await?;
    Ok(Json(json!({
        "conversation": thread.conversation,
        "messages": thread.messages,
    })))
}

async fn create(
    State(state): State<AppState>,
    LenientJson(body): LenientJson,
) -> Result<(StatusCode, Json<Conversation>), ApiError> {
    let title = json_text(body.get("title"));
    let db = state.db;
    let created = blocking(move || create_conversation(&db, &title)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn save(
    State(state): State<AppState>,
    PathId(id): PathId,
    LenientJson(body): LenientJson,
) -> Result<Json<Value>, ApiError> {
    let request = ConversationSave::from_json(&body)?;
    let db = state.db;
    blocking(move || save_conversation(&db, id, &request)).await?;
    Ok(Json(json!({ "ok": true })))
}

async fn remove(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> Result<StatusCode, ApiError> {
    let db = state.db;
    blocking(move || delete_conversation(&db, id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn clear(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    let db = state.db;
    blocking(move || clear_conversations(&db)).await?;
    Ok(StatusCode::NO_CONTENT)
}
