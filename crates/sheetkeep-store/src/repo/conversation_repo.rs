//! Conversations and their messages

#![allow(clippy::result_large_err)]

use crate::errors::{sqlite_error, Result};
use rusqlite::{Connection, OptionalExtension, Row};
use sheetkeep_core::errors::{ExError, ExErrorKind};
use sheetkeep_core::model::{
    now_timestamp, Conversation, ConversationMessage, ConversationThread, NewMessage,
};

pub struct ConversationRepo;

impl ConversationRepo {
    /// The most recently updated conversation, if any
    pub fn recent(conn: &Connection) -> Result<Option<Conversation>> {
        conn.query_row(
            "SELECT id, title, created_at, updated_at FROM conversations
             ORDER BY updated_at DESC, id DESC LIMIT 1",
            [],
            row_to_conversation,
        )
        .optional()
        .map_err(|e| sqlite_error("conversation_recent", e))
    }

    pub fn list(conn: &Connection) -> Result<Vec<Conversation>> {
        let mut stmt = conn
            .prepare(
                "SELECT id, title, created_at, updated_at FROM conversations
                 ORDER BY updated_at DESC, id DESC",
            )
            .map_err(|e| sqlite_error("conversation_list", e))?;
        let rows = stmt
            .query_map([], row_to_conversation)
            .map_err(|e| sqlite_error("conversation_list", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| sqlite_error("conversation_list", e))?;
        Ok(rows)
    }

    pub fn get(conn: &Connection, id: i64) -> Result<Option<Conversation>> {
        conn.query_row(
            "SELECT id, title, created_at, updated_at FROM conversations WHERE id = ?1",
            [id],
            row_to_conversation,
        )
        .optional()
        .map_err(|e| sqlite_error("conversation_get", e).with_entity_id(id.to_string()))
    }

    /// Conversation plus its messages in insertion order
    pub fn thread(conn: &Connection, id: i64) -> Result<Option<ConversationThread>> {
        let Some(conversation) = Self::get(conn, id)? else {
            return Ok(None);
        };

        let mut stmt = conn
            .prepare(
                "SELECT id, conversation_id, role, content, created_at
                 FROM conversation_messages WHERE conversation_id = ?1 ORDER BY id ASC",
            )
            .map_err(|e| sqlite_error("conversation_thread", e))?;
        let messages = stmt
            .query_map([id], row_to_message)
            .map_err(|e| sqlite_error("conversation_thread", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| sqlite_error("conversation_thread", e))?;

        Ok(Some(ConversationThread {
            conversation,
            messages,
        }))
    }

    pub fn create(conn: &Connection, title: &str) -> Result<Conversation> {
        let now = now_timestamp();
        conn.execute(
            "INSERT INTO conversations (title, created_at, updated_at) VALUES (?1, ?2, ?2)",
            rusqlite::params![title, now],
        )
        .map_err(|e| sqlite_error("conversation_create", e))?;

        let id = conn.last_insert_rowid();
        Self::get(conn, id)?.ok_or_else(|| {
            ExError::new(ExErrorKind::Internal)
                .with_op("conversation_create")
                .with_message("insert ok but cannot read back row")
        })
    }

    /// Replace the title and the full message list in one transaction
    ///
    /// Messages that are not storable (empty role or content) are skipped.
    /// Returns the number of messages written.
    pub fn save(
        conn: &mut Connection,
        id: i64,
        title: &str,
        messages: &[NewMessage],
    ) -> Result<usize> {
        let tx = conn
            .transaction()
            .map_err(|e| sqlite_error("conversation_save", e))?;
        let now = now_timestamp();

        let changed = tx
            .execute(
                "UPDATE conversations SET title = ?1, updated_at = ?2 WHERE id = ?3",
                rusqlite::params![title, now, id],
            )
            .map_err(|e| sqlite_error("conversation_save", e).with_entity_id(id.to_string()))?;
        if changed == 0 {
            return Err(ExError::not_found("conversation_save", id.to_string()));
        }

        tx.execute(
            "DELETE FROM conversation_messages WHERE conversation_id = ?1",
            [id],
        )
        .map_err(|e| sqlite_error("conversation_save", e))?;

        let mut written = 0;
        {
            let mut insert = tx
                .prepare(
                    "INSERT INTO conversation_messages (conversation_id, role, content, created_at)
                     VALUES (?1, ?2, ?3, ?4)",
                )
                .map_err(|e| sqlite_error("conversation_save", e))?;
            for message in messages.iter().filter(|m| m.is_storable()) {
                insert
                    .execute(rusqlite::params![id, message.role, message.content, now])
                    .map_err(|e| sqlite_error("conversation_save", e))?;
                written += 1;
            }
        }

        tx.commit()
            .map_err(|e| sqlite_error("conversation_save", e))?;
        Ok(written)
    }

    /// Delete one conversation; its messages go with it
    pub fn delete(conn: &Connection, id: i64) -> Result<()> {
        let removed = conn
            .execute("DELETE FROM conversations WHERE id = ?1", [id])
            .map_err(|e| sqlite_error("conversation_delete", e).with_entity_id(id.to_string()))?;
        if removed == 0 {
            return Err(ExError::not_found("conversation_delete", id.to_string()));
        }
        Ok(())
    }

    pub fn clear(conn: &Connection) -> Result<usize> {
        conn.execute("DELETE FROM conversations", [])
            .map_err(|e| sqlite_error("conversation_clear", e))
    }
}

fn row_to_conversation(row: &Row<'_>) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: row.get(0)?,
        title: row.get(1)?,
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
    })
}

fn row_to_message(row: &Row<'_>) -> rusqlite::Result<ConversationMessage> {
    Ok(ConversationMessage {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        role: row.get(2)?,
        content: row.get(3)?,
        created_at: row.get(4)?,
    })
}
