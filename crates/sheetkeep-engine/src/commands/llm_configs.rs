//! LLM provider config commands

#![allow(clippy::result_large_err)]

use crate::commands::logged;
use serde_json::Value;
use sheetkeep_core::errors::ExError;
use sheetkeep_core::model::coerce::json_text;
use sheetkeep_core::model::{LlmConfig, LlmConfigInput};
use sheetkeep_store::errors::Result;
use sheetkeep_store::repo::LlmConfigRepo;
use sheetkeep_store::Database;

/// Read `{ name, provider, baseUrl?, apiKey?, modelName? }`
///
/// `name` and `provider` must be non-empty strings. Optional fields default
/// to the empty string.
pub fn parse_llm_config(body: &Value) -> Result<LlmConfigInput> {
    let field = |name: &str| body.as_object().and_then(|o| o.get(name));

    let name = required_text(field("name"), "name required")?;
    let provider = required_text(field("provider"), "provider required")?;

    Ok(LlmConfigInput {
        name,
        provider,
        base_url: json_text(field("baseUrl")),
        api_key: json_text(field("apiKey")).into(),
        model_name: json_text(field("modelName")),
    })
}

fn required_text(value: Option<&Value>, message: &str) -> Result<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        _ => Err(ExError::invalid_input("parse_llm_config", message)),
    }
}

pub fn list_llm_configs(db: &Database) -> Result<Vec<LlmConfig>> {
    logged("llm_config_list", || {
        db.with_connection(|conn| LlmConfigRepo::list(conn))
    })
}

pub fn get_llm_config(db: &Database, id: i64) -> Result<LlmConfig> {
    logged("llm_config_get", || {
        db.with_connection(|conn| LlmConfigRepo::get(conn, id))?
            .ok_or_else(|| ExError::not_found("llm_config_get", id.to_string()))
    })
}

pub fn create_llm_config(db: &Database, input: &LlmConfigInput) -> Result<LlmConfig> {
    logged("llm_config_create", || {
        db.with_connection(|conn| LlmConfigRepo::create(conn, input))
    })
}

pub fn update_llm_config(db: &Database, id: i64, input: &LlmConfigInput) -> Result<LlmConfig> {
    logged("llm_config_update", || {
        db.with_connection(|conn| LlmConfigRepo::update(conn, id, input))
    })
}

pub fn delete_llm_config(db: &Database, id: i64) -> Result<()> {
    logged("llm_config_delete", || {
        db.with_connection(|conn| LlmConfigRepo::delete(conn, id))
    })
}
