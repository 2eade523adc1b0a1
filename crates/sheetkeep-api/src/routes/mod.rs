//! Route table under `/api`

pub mod conversations;
pub mod llm_configs;
pub mod settings;
pub mod system_prompts;
pub mod workbook;

use crate::state::AppState;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .merge(workbook::routes())
        .merge(llm_configs::routes())
        .merge(conversations::routes())
        .merge(system_prompts::routes())
        .merge(settings::routes())
}

async fn root() -> Json<Value> {
    Json(json!({ "ok": true, "message": "Local API mounted at /api" }))
}
