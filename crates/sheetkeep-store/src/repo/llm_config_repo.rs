//! LLM provider configs

#![allow(clippy::result_large_err)]

use crate::errors::{is_unique_violation, sqlite_error, Result};
use rusqlite::{Connection, OptionalExtension, Row};
use sheetkeep_core::errors::{ExError, ExErrorKind};
use sheetkeep_core::model::{now_timestamp, LlmConfig, LlmConfigInput};

const COLUMNS: &str =
    "id, name, provider, base_url, api_key, model_name, created_at, updated_at";

pub struct LlmConfigRepo;

impl LlmConfigRepo {
    /// All configs, most recently updated first
    pub fn list(conn: &Connection) -> Result<Vec<LlmConfig>> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {COLUMNS} FROM llm_configs ORDER BY updated_at DESC, id DESC"
            ))
            .map_err(|e| sqlite_error("llm_config_list", e))?;
        let rows = stmt
            .query_map([], row_to_config)
            .map_err(|e| sqlite_error("llm_config_list", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| sqlite_error("llm_config_list", e))?;
        Ok(rows)
    }

    pub fn get(conn: &Connection, id: i64) -> Result<Option<LlmConfig>> {
        conn.query_row(
            &format!("SELECT {COLUMNS} FROM llm_configs WHERE id = ?1"),
            [id],
            row_to_config,
        )
        .optional()
        .map_err(|e| sqlite_error("llm_config_get", e).with_entity_id(id.to_string()))
    }

    /// Insert a config; names are unique
    pub fn create(conn: &Connection, input: &LlmConfigInput) -> Result<LlmConfig> {
        let now = now_timestamp();
        conn.execute(
            "INSERT INTO llm_configs (name, provider, base_url, api_key, model_name, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            rusqlite::params![
                input.name,
                input.provider,
                input.base_url,
                input.api_key.expose(),
                input.model_name,
                now
            ],
        )
        .map_err(|e| write_error("llm_config_create", &input.name, e))?;

        let id = conn.last_insert_rowid();
        Self::get(conn, id)?.ok_or_else(|| {
            ExError::new(ExErrorKind::Internal)
                .with_op("llm_config_create")
                .with_message("insert ok but cannot read back row")
        })
    }

    /// Replace every field of an existing config
    pub fn update(conn: &Connection, id: i64, input: &LlmConfigInput) -> Result<LlmConfig> {
        let changed = conn
            .execute(
                "UPDATE llm_configs
                 SET name = ?1, provider = ?2, base_url = ?3, api_key = ?4, model_name = ?5, updated_at = ?6
                 WHERE id = ?7",
                rusqlite::params![
                    input.name,
                    input.provider,
                    input.base_url,
                    input.api_key.expose(),
                    input.model_name,
                    now_timestamp(),
                    id
                ],
            )
            .map_err(|e| write_error("llm_config_update", &input.name, e))?;

        if changed == 0 {
            return Err(ExError::not_found("llm_config_update", id.to_string()));
        }
        Self::get(conn, id)?.ok_or_else(|| ExError::not_found("llm_config_update", id.to_string()))
    }

    pub fn delete(conn: &Connection, id: i64) -> Result<()> {
        let removed = conn
            .execute("DELETE FROM llm_configs WHERE id = ?1", [id])
            .map_err(|e| sqlite_error("llm_config_delete", e).with_entity_id(id.to_string()))?;
        if removed == 0 {
            return Err(ExError::not_found("llm_config_delete", id.to_string()));
        }
        Ok(())
    }
}

fn row_to_config(row: &Row<'_>) -> rusqlite::Result<LlmConfig> {
    Ok(LlmConfig {
        id: row.get(0)?,
        name: row.get(1)?,
        provider: row.get(2)?,
        base_url: row.get(3)?,
        api_key: row.get(4)?,
        model_name: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn write_error(op: &str, name: &str, err: rusqlite::Error) -> ExError {
    if is_unique_violation(&err) {
        ExError::new(ExErrorKind::AlreadyExists)
            .with_op(op)
            .with_entity_id(name)
            .with_message("name already exists")
    } else {
        sqlite_error(op, err)
    }
}
