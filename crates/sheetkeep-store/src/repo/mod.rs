//! Repositories for application state tables
//!
//! Each repository is a unit struct with associated functions taking a
//! connection, so callers choose the connection (and transaction) scope.

pub mod conversation_repo;
pub mod llm_config_repo;
pub mod settings_repo;
pub mod system_prompt_repo;

pub use conversation_repo::ConversationRepo;
pub use llm_config_repo::LlmConfigRepo;
pub use settings_repo::SettingsRepo;
pub use system_prompt_repo::SystemPromptRepo;
