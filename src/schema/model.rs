use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    Ll,
    Embed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub id: String,
    #[serde(rename = "type")]
    pub model_type: ModelType,
    pub provider: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub api_base: Option<String>,
    #[serde(default)]
    pub max_input_tokens: Option<u32>,
    #[serde(default)]
    pub max_chunk_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl ModelConfig {
    /// `provider/id`, the key used by the model routes and by settings.
    pub fn key(&self) -> String {
        format!("{}/{}", self.provider, self.id)
    }

    pub fn merge_update(&mut self, update: ModelConfig) {
        let api_key = update.api_key.or_else(|| self.api_key.take());
        *self = ModelConfig { api_key, ..update };
    }
}

/// Models known out of the box when the configuration document lists none.
pub fn default_models() -> Vec<ModelConfig> {
    let entry = |id: &str, model_type, provider: &str, api_base: &str, max: Option<u32>| {
        ModelConfig {
            id: id.to_string(),
            model_type,
            provider: provider.to_string(),
            enabled: false,
            api_base: Some(api_base.to_string()),
            max_input_tokens: if model_type == ModelType::Ll { max } else { None },
            max_chunk_size: if model_type == ModelType::Embed { max } else { None },
            api_key: None,
        }
    };

    vec![
        entry("gpt-4o-mini", ModelType::Ll, "openai", "https://api.openai.com/v1", Some(128_000)),
        entry("llama3.1", ModelType::Ll, "ollama", "http://localhost:11434", Some(131_072)),
        entry(
            "cohere.command-r-plus-08-2024",
            ModelType::Ll,
            "oci",
            "https://inference.generativeai.us-chicago-1.oci.oraclecloud.com",
            Some(131_072),
        ),
        entry(
            "text-embedding-3-small",
            ModelType::Embed,
            "openai",
            "https://api.openai.com/v1",
            Some(8191),
        ),
        entry("mxbai-embed-large", ModelType::Embed, "ollama", "http://localhost:11434", Some(512)),
    ]
}
