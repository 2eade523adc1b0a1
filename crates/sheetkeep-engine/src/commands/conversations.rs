//! Conversation commands

#![allow(clippy::result_large_err)]

use crate::commands::logged;
use serde_json::Value;
use sheetkeep_core::errors::ExError;
use sheetkeep_core::model::coerce::json_text;
use sheetkeep_core::model::{Conversation, ConversationThread, NewMessage};
use sheetkeep_store::errors::Result;
use sheetkeep_store::repo::ConversationRepo;
use sheetkeep_store::Database;

/// Title and messages of a full-conversation save
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConversationSave {
    pub title: String,
    pub messages: Vec<NewMessage>,
}

impl ConversationSave {
    /// Read `{ title?, messages? }`; `messages` must be an array when present
    pub fn from_json(body: &Value) -> Result<Self> {
        let field = |name: &str| body.as_object().and_then(|o| o.get(name));

        let messages = match field("messages") {
            None => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|m| NewMessage {
                    role: json_text(m.get("role")),
                    content: json_text(m.get("content")),
                })
                .collect(),
            Some(_) => {
                return Err(ExError::invalid_input(
                    "conversation_save",
                    "messages must be array",
                ))
            }
        };

        Ok(Self {
            title: json_text(field("title")),
            messages,
        })
    }
}

pub fn recent_conversation(db: &Database) -> Result<Option<Conversation>> {
    logged("conversation_recent", || {
        db.with_connection(|conn| ConversationRepo::recent(conn))
    })
}

pub fn list_conversations(db: &Database) -> Result<Vec<Conversation>> {
    logged("conversation_list", || {
        db.with_connection(|conn| ConversationRepo::list(conn))
    })
}

pub fn conversation_thread(db: &Database, id: i64) -> Result<ConversationThread> {
    logged("conversation_thread", || {
        db.with_connection(|conn| ConversationRepo::thread(conn, id))?
            .ok_or_else(|| ExError::not_found("conversation_thread", id.to_string()))
    })
}

pub fn create_conversation(db: &Database, title: &str) -> Result<Conversation> {
    logged("conversation_create", || {
        db.with_connection(|conn| ConversationRepo::create(conn, title))
    })
}

/// Replace title and messages; returns how many messages were stored
pub fn save_conversation(db: &Database, id: i64, save: &ConversationSave) -> Result<usize> {
    logged("conversation_save", || {
        db.with_connection(|conn| ConversationRepo::save(conn, id, &save.title, &save.messages))
    })
}

pub fn delete_conversation(db: &Database, id: i64) -> Result<()> {
    logged("conversation_delete", || {
        db.with_connection(|conn| ConversationRepo::delete(conn, id))
    })
}

pub fn clear_conversations(db: &Database) -> Result<usize> {
    logged("conversation_clear", || {
        db.with_connection(|conn| ConversationRepo::clear(conn))
    })
}
