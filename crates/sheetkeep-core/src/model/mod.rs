//! Domain models persisted by SheetKeep

pub mod coerce;
pub mod conversation;
pub mod llm_config;
pub mod snapshot;
pub mod system_prompt;

pub use conversation::{Conversation, ConversationMessage, ConversationThread, NewMessage};
pub use llm_config::{LlmConfig, LlmConfigInput};
pub use snapshot::{
    ExpectedVersion, PayloadError, PutOutcome, SnapshotPayload, WorkbookSnapshot,
    DEFAULT_MAX_SNAPSHOT_BYTES, DEFAULT_WORKBOOK_KEY,
};
pub use system_prompt::{SystemPrompt, SystemPromptInput, ACTIVE_SYSTEM_PROMPT_KEY};

/// Current time as stored in `created_at` / `updated_at` columns
///
/// RFC 3339 in UTC with millisecond precision, so that lexical order matches
/// chronological order.
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
