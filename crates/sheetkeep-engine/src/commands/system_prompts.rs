//! System prompt commands and the active-prompt setting

#![allow(clippy::result_large_err)]

use crate::commands::logged;
use serde_json::Value;
use sheetkeep_core::errors::{ExError, ExErrorKind};
use sheetkeep_core::model::coerce::json_number;
use sheetkeep_core::model::{SystemPrompt, SystemPromptInput};
use sheetkeep_store::errors::Result;
use sheetkeep_store::repo::{SettingsRepo, SystemPromptRepo};
use sheetkeep_store::Database;

/// Read `{ name, content }`; both must be non-empty strings
pub fn parse_system_prompt(body: &Value) -> Result<SystemPromptInput> {
    let field = |name: &str| match body.as_object().and_then(|o| o.get(name)) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    };

    let name = field("name")
        .ok_or_else(|| ExError::invalid_input("parse_system_prompt", "name required"))?;
    let content = field("content")
        .ok_or_else(|| ExError::invalid_input("parse_system_prompt", "content required"))?;
    Ok(SystemPromptInput { name, content })
}

pub fn list_system_prompts(db: &Database) -> Result<Vec<SystemPrompt>> {
    logged("system_prompt_list", || {
        db.with_connection(|conn| SystemPromptRepo::list(conn))
    })
}

pub fn get_system_prompt(db: &Database, id: i64) -> Result<SystemPrompt> {
    logged("system_prompt_get", || {
        db.with_connection(|conn| SystemPromptRepo::get(conn, id))?
            .ok_or_else(|| ExError::not_found("system_prompt_get", id.to_string()))
    })
}

pub fn create_system_prompt(db: &Database, input: &SystemPromptInput) -> Result<SystemPrompt> {
    logged("system_prompt_create", || {
        db.with_connection(|conn| SystemPromptRepo::create(conn, input))
    })
}

pub fn update_system_prompt(
    db: &Database,
    id: i64,
    input: &SystemPromptInput,
) -> Result<SystemPrompt> {
    logged("system_prompt_update", || {
        db.with_connection(|conn| SystemPromptRepo::update(conn, id, input))
    })
}

/// Delete a prompt; clears the active selection if it was this one
pub fn delete_system_prompt(db: &Database, id: i64) -> Result<()> {
    logged("system_prompt_delete", || {
        db.with_connection(|conn| SystemPromptRepo::delete(conn, id))
    })
}

pub fn active_system_prompt(db: &Database) -> Result<Option<i64>> {
    logged("active_system_prompt_get", || {
        db.with_connection(|conn| SettingsRepo::active_system_prompt(conn))
    })
}

/// Apply `{ activeSystemPromptId }` and return the stored selection
///
/// `null` or absent clears the selection. Anything that is not a finite
/// number is invalid input; a number naming no prompt is `NotFound`.
pub fn set_active_system_prompt(db: &Database, body: &Value) -> Result<Option<i64>> {
    let raw = body
        .as_object()
        .and_then(|o| o.get("activeSystemPromptId"))
        .filter(|v| !v.is_null());

    let id = match raw {
        None => None,
        Some(value) => {
            let n = json_number(Some(value))
                .filter(|n| n.is_finite())
                .ok_or_else(|| {
                    ExError::invalid_input("set_active_system_prompt", "invalid activeSystemPromptId")
                })?;
            if n.fract() != 0.0 || n.abs() > i64::MAX as f64 {
                return Err(ExError::new(ExErrorKind::NotFound)
                    .with_op("set_active_system_prompt")
                    .with_entity_id(n.to_string())
                    .with_message("system prompt not found"));
            }
            Some(n as i64)
        }
    };

    logged("active_system_prompt_set", || {
        db.with_connection(|conn| SettingsRepo::set_active_system_prompt(conn, id))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_system_prompt() {
        let input = parse_system_prompt(&json!({"name": "n", "content": "c"})).unwrap();
        assert_eq!(input.name, "n");
        assert_eq!(input.content, "c");

        let err = parse_system_prompt(&json!({"name": "n", "content": ""})).unwrap_err();
        assert_eq!(err.message(), "content required");
        let err = parse_system_prompt(&json!({"content": "c"})).unwrap_err();
        assert_eq!(err.message(), "name required");
    }
}
