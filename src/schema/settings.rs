use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_CLIENT: &str = "default";
pub const SERVER_CLIENT: &str = "server";
pub const DEFAULT_ALIAS: &str = "DEFAULT";
pub const DEFAULT_PROMPT: &str = "basic-example";

/// Per-client configuration record.
///
/// Every field carries a default, so a partial JSON document always
/// deserializes into a complete record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub client: String,
    pub ll_model: LanguageModelSettings,
    pub rag: RagSettings,
    pub prompts: PromptSelection,
    pub oci: OciSelection,
}

impl Settings {
    pub fn new(client: impl Into<String>) -> Self {
        Self {
            client: client.into(),
            ..Self::default()
        }
    }

    /// Builds the settings for `client` from a (possibly partial) JSON
    /// document. The `client` field of the document is ignored.
    pub fn from_json(client: &str, value: Value) -> Result<Self, serde_json::Error> {
        let mut settings: Settings = serde_json::from_value(value)?;
        settings.client = client.to_string();
        Ok(settings)
    }

    /// Copy of these settings under a different client key.
    pub fn for_client(&self, client: &str) -> Self {
        Self {
            client: client.to_string(),
            ..self.clone()
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            client: DEFAULT_CLIENT.to_string(),
            ll_model: LanguageModelSettings::default(),
            rag: RagSettings::default(),
            prompts: PromptSelection::default(),
            oci: OciSelection::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageModelSettings {
    pub model: Option<String>,
    pub temperature: f32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    pub max_tokens: u32,
    pub streaming: bool,
    pub chat_history: bool,
}

impl Default for LanguageModelSettings {
    fn default() -> Self {
        Self {
            model: None,
            temperature: 0.5,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            max_tokens: 4096,
            streaming: false,
            chat_history: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DistanceMetric {
    #[default]
    Cosine,
    EuclideanDistance,
    DotProduct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IndexType {
    #[default]
    #[serde(rename = "HNSW")]
    Hnsw,
    #[serde(rename = "IVF")]
    Ivf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SearchType {
    #[default]
    Similarity,
    #[serde(rename = "Similarity Score Threshold")]
    SimilarityScoreThreshold,
    #[serde(rename = "Maximal Marginal Relevance")]
    MaximalMarginalRelevance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RagSettings {
    pub database_alias: String,
    pub vector_store: Option<String>,
    pub model: Option<String>,
    pub chunk_size: Option<u32>,
    pub chunk_overlap: Option<u32>,
    pub distance_metric: DistanceMetric,
    pub index_type: IndexType,
    pub enabled: bool,
    pub search_type: SearchType,
    pub top_k: u32,
    pub score_threshold: f32,
    pub fetch_k: u32,
    pub lambda_mult: f32,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            database_alias: DEFAULT_ALIAS.to_string(),
            vector_store: None,
            model: None,
            chunk_size: None,
            chunk_overlap: None,
            distance_metric: DistanceMetric::default(),
            index_type: IndexType::default(),
            enabled: false,
            search_type: SearchType::default(),
            top_k: 4,
            score_threshold: 0.0,
            fetch_k: 20,
            lambda_mult: 0.5,
        }
    }
}

/// Names of the selected system and context prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptSelection {
    pub sys: String,
    pub ctx: String,
}

impl Default for PromptSelection {
    fn default() -> Self {
        Self {
            sys: DEFAULT_PROMPT.to_string(),
            ctx: DEFAULT_PROMPT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OciSelection {
    pub auth_profile: String,
}

impl Default for OciSelection {
    fn default() -> Self {
        Self {
            auth_profile: DEFAULT_ALIAS.to_string(),
        }
    }
}
