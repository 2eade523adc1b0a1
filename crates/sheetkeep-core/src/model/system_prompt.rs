use serde::Serialize;

/// Setting key holding the id of the active system prompt
pub const ACTIVE_SYSTEM_PROMPT_KEY: &str = "activeSystemPromptId";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemPrompt {
    pub id: i64,
    pub name: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default)]
pub struct SystemPromptInput {
    pub name: String,
    pub content: String,
}
