use schemars::JsonSchema;
use serde::Deserialize;

/// Arguments of `optimizer_vs-discovery`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct VectorStoreDiscoveryArgs {
    /// Database alias to inspect; the client's RAG database when omitted.
    pub database_alias: Option<String>,
}

/// Arguments of `optimizer_vs-retriever`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct VectorSearchArgs {
    /// Standalone question used for the similarity search.
    pub question: String,
    /// Vector store to search; the client's selection when omitted.
    pub vector_store: Option<String>,
    /// Number of documents to return.
    pub top_k: Option<u32>,
}

/// Arguments of `optimizer_vs-rephrase`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct RephraseArgs {
    pub question: String,
    #[serde(default)]
    pub chat_history: Vec<String>,
}

/// Arguments of `optimizer_vs-grade`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GradeArgs {
    pub question: String,
    pub documents: Vec<String>,
}
