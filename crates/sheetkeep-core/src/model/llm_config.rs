use serde::Serialize;
use sheetkeep_core_types::Sensitive;

/// A saved LLM provider configuration
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmConfig {
    pub id: i64,
    pub name: String,
    pub provider: String,
    pub base_url: String,
    pub api_key: String,
    pub model_name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("api_key", &Sensitive::new(&self.api_key))
            .field("model_name", &self.model_name)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Fields accepted when creating or replacing an LLM config
#[derive(Clone, Default)]
pub struct LlmConfigInput {
    pub name: String,
    pub provider: String,
    pub base_url: String,
    pub api_key: Sensitive<String>,
    pub model_name: String,
}

impl std::fmt::Debug for LlmConfigInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfigInput")
            .field("name", &self.name)
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key)
            .field("model_name", &self.model_name)
            .finish()
    }
}
