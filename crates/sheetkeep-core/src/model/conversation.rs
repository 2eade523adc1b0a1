use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: i64,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMessage {
    pub id: i64,
    pub conversation_id: i64,
    pub role: String,
    pub content: String,
    pub created_at: String,
}

/// A message as submitted by a client, before it is assigned an id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub role: String,
    pub content: String,
}

impl NewMessage {
    /// Messages with an empty role or empty content are not stored
    pub fn is_storable(&self) -> bool {
        !self.role.is_empty() && !self.content.is_empty()
    }
}

/// A conversation together with its messages in insertion order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationThread {
    pub conversation: Conversation,
    pub messages: Vec<ConversationMessage>,
}
