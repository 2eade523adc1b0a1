//! Key/value application settings

#![allow(clippy::result_large_err)]

use crate::errors::{sqlite_error, Result};
use crate::repo::SystemPromptRepo;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior};
use sheetkeep_core::errors::{ExError, ExErrorKind};
use sheetkeep_core::model::{now_timestamp, ACTIVE_SYSTEM_PROMPT_KEY};

pub struct SettingsRepo;

impl SettingsRepo {
    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        conn.query_row(
            "SELECT value FROM app_settings WHERE key = ?1",
            [key],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| sqlite_error("setting_get", e).with_entity_id(key))
    }

    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO app_settings (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            rusqlite::params![key, value, now_timestamp()],
        )
        .map_err(|e| sqlite_error("setting_set", e).with_entity_id(key))?;
        Ok(())
    }

    pub fn remove(conn: &Connection, key: &str) -> Result<()> {
        conn.execute("DELETE FROM app_settings WHERE key = ?1", [key])
            .map_err(|e| sqlite_error("setting_remove", e).with_entity_id(key))?;
        Ok(())
    }

    /// Id of the active system prompt; unparseable stored values read as unset
    pub fn active_system_prompt(conn: &Connection) -> Result<Option<i64>> {
        Ok(Self::get(conn, ACTIVE_SYSTEM_PROMPT_KEY)?.and_then(|v| v.trim().parse().ok()))
    }

    /// Select (or with `None`, clear) the active system prompt
    ///
    /// Fails with `NotFound` if the prompt does not exist. The existence
    /// check and the write share one immediate transaction, so a concurrent
    /// prompt delete cannot leave a dangling id behind.
    pub fn set_active_system_prompt(
        conn: &mut Connection,
        id: Option<i64>,
    ) -> Result<Option<i64>> {
        let Some(id) = id else {
            Self::remove(conn, ACTIVE_SYSTEM_PROMPT_KEY)?;
            return Ok(None);
        };

        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| sqlite_error("set_active_system_prompt", e))?;

        if !SystemPromptRepo::exists(&tx, id)? {
            return Err(ExError::new(ExErrorKind::NotFound)
                .with_op("set_active_system_prompt")
                .with_entity_id(id.to_string())
                .with_message("system prompt not found"));
        }

        Self::set(&tx, ACTIVE_SYSTEM_PROMPT_KEY, &id.to_string())?;
        tx.commit()
            .map_err(|e| sqlite_error("set_active_system_prompt", e))?;
        Ok(Some(id))
    }
}
