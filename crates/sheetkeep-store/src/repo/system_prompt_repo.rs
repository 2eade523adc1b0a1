//! System prompts

#![allow(clippy::result_large_err)]

use crate::errors::{is_unique_violation, sqlite_error, Result};
use rusqlite::{Connection, OptionalExtension, Row};
use sheetkeep_core::errors::{ExError, ExErrorKind};
use sheetkeep_core::model::{
    now_timestamp, SystemPrompt, SystemPromptInput, ACTIVE_SYSTEM_PROMPT_KEY,
};

pub struct SystemPromptRepo;

impl SystemPromptRepo {
    pub fn list(conn: &Connection) -> Result<Vec<SystemPrompt>> {
        let mut stmt = conn
            .prepare(
                "SELECT id, name, content, created_at, updated_at
                 FROM system_prompts ORDER BY updated_at DESC, id DESC",
            )
            .map_err(|e| sqlite_error("system_prompt_list", e))?;
        let rows = stmt
            .query_map([], row_to_prompt)
            .map_err(|e| sqlite_error("system_prompt_list", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| sqlite_error("system_prompt_list", e))?;
        Ok(rows)
    }

    pub fn get(conn: &Connection, id: i64) -> Result<Option<SystemPrompt>> {
        conn.query_row(
            "SELECT id, name, content, created_at, updated_at FROM system_prompts WHERE id = ?1",
            [id],
            row_to_prompt,
        )
        .optional()
        .map_err(|e| sqlite_error("system_prompt_get", e).with_entity_id(id.to_string()))
    }

    pub fn exists(conn: &Connection, id: i64) -> Result<bool> {
        Ok(Self::get(conn, id)?.is_some())
    }

    pub fn create(conn: &Connection, input: &SystemPromptInput) -> Result<SystemPrompt> {
        let now = now_timestamp();
        conn.execute(
            "INSERT INTO system_prompts (name, content, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
            rusqlite::params![input.name, input.content, now],
        )
        .map_err(|e| write_error("system_prompt_create", &input.name, e))?;

        let id = conn.last_insert_rowid();
        Self::get(conn, id)?.ok_or_else(|| {
            ExError::new(ExErrorKind::Internal)
                .with_op("system_prompt_create")
                .with_message("insert ok but cannot read back row")
        })
    }

    pub fn update(conn: &Connection, id: i64, input: &SystemPromptInput) -> Result<SystemPrompt> {
        let changed = conn
            .execute(
                "UPDATE system_prompts SET name = ?1, content = ?2, updated_at = ?3 WHERE id = ?4",
                rusqlite::params![input.name, input.content, now_timestamp(), id],
            )
            .map_err(|e| write_error("system_prompt_update", &input.name, e))?;

        if changed == 0 {
            return Err(ExError::not_found("system_prompt_update", id.to_string()));
        }
        Self::get(conn, id)?
            .ok_or_else(|| ExError::not_found("system_prompt_update", id.to_string()))
    }

    /// Delete a prompt, clearing the active-prompt setting if it pointed here
    pub fn delete(conn: &mut Connection, id: i64) -> Result<()> {
        let tx = conn
            .transaction()
            .map_err(|e| sqlite_error("system_prompt_delete", e))?;

        let removed = tx
            .execute("DELETE FROM system_prompts WHERE id = ?1", [id])
            .map_err(|e| sqlite_error("system_prompt_delete", e).with_entity_id(id.to_string()))?;
        if removed == 0 {
            return Err(ExError::not_found("system_prompt_delete", id.to_string()));
        }

        tx.execute(
            "DELETE FROM app_settings WHERE key = ?1 AND value = ?2",
            rusqlite::params![ACTIVE_SYSTEM_PROMPT_KEY, id.to_string()],
        )
        .map_err(|e| sqlite_error("system_prompt_delete", e))?;

        tx.commit()
            .map_err(|e| sqlite_error("system_prompt_delete", e))?;
        Ok(())
    }
}

fn row_to_prompt(row: &Row<'_>) -> rusqlite::Result<SystemPrompt> {
    Ok(SystemPrompt {
        id: row.get(0)?,
        name: row.get(1)?,
        content: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
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
