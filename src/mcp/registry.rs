use schemars::{schema_for, JsonSchema};
use serde::Serialize;
use serde_json::{json, Value};

use super::tools::{GradeArgs, RephraseArgs, VectorSearchArgs, VectorStoreDiscoveryArgs};
use crate::prompts::PromptService;

pub const SERVER_NAME: &str = "aio-server";

#[derive(Debug, Clone, Serialize)]
pub struct McpToolInfo {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct McpResourceInfo {
    pub uri: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct McpPromptInfo {
    pub name: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub text: String,
    pub customized: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct McpStatus {
    pub name: String,
    pub version: String,
    pub status: String,
    pub tools: usize,
    pub resources: usize,
    pub prompts: usize,
}

#[derive(Debug, Clone)]
pub struct McpRegistry {
    name: String,
    version: String,
    tools: Vec<McpToolInfo>,
    resources: Vec<McpResourceInfo>,
}

impl McpRegistry {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            tools: Vec::new(),
            resources: Vec::new(),
        }
    }

    /// Registry with every capability the server ships.
    pub fn builtin() -> Self {
        let mut registry = Self::new(SERVER_NAME, env!("CARGO_PKG_VERSION"));

        registry.register_tool::<VectorStoreDiscoveryArgs>(
            "optimizer_vs-discovery",
            "List the vector stores available in a configured database",
        );
        registry.register_tool::<VectorSearchArgs>(
            "optimizer_vs-retriever",
            "Search a vector store for documents relevant to a question",
        );
        registry.register_tool::<RephraseArgs>(
            "optimizer_vs-rephrase",
            "Rewrite a follow-up question into a standalone question using chat history",
        );
        registry.register_tool::<GradeArgs>(
            "optimizer_vs-grade",
            "Grade whether retrieved documents are relevant to a question",
        );

        registry.register_resource(
            "config://settings/{client}",
            "client-settings",
            "Settings of a client without secrets",
            "application/json",
        );
        registry.register_resource(
            "config://prompts",
            "prompt-catalogue",
            "Registered prompts with their effective text",
            "application/json",
        );

        registry
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Registers a tool whose input schema is derived from `A`. A second
    /// registration under the same name replaces the first.
    pub fn register_tool<A: JsonSchema>(&mut self, name: &str, description: &str) {
        let input_schema = serde_json::to_value(schema_for!(A))
            .unwrap_or_else(|_| json!({ "type": "object" }));
        let tool = McpToolInfo {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
        };
        match self.tools.iter_mut().find(|existing| existing.name == name) {
            Some(existing) => {
                tracing::warn!("MCP tool '{}' registered twice; replacing", name);
                *existing = tool;
            }
            None => self.tools.push(tool),
        }
    }

    pub fn register_resource(&mut self, uri: &str, name: &str, description: &str, mime_type: &str) {
        self.resources.retain(|existing| existing.uri != uri);
        self.resources.push(McpResourceInfo {
            uri: uri.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            mime_type: mime_type.to_string(),
        });
    }

    pub fn tools(&self) -> &[McpToolInfo] {
        &self.tools
    }

    pub fn resources(&self) -> &[McpResourceInfo] {
        &self.resources
    }

    /// Prompts exposed over MCP, named `optimizer_<category>-<name>`.
    pub fn prompts(&self, prompts: &PromptService) -> Vec<McpPromptInfo> {
        prompts
            .list()
            .into_iter()
            .map(|prompt| McpPromptInfo {
                name: format!("optimizer_{}-{}", prompt.category, prompt.name),
                title: prompt.title,
                description: prompt.description,
                tags: prompt.tags,
                text: prompt.text,
                customized: prompt.customized,
            })
            .collect()
    }

    pub fn status(&self, prompts: &PromptService) -> McpStatus {
        McpStatus {
            name: self.name.clone(),
            version: self.version.clone(),
            status: "ready".to_string(),
            tools: self.tools.len(),
            resources: self.resources.len(),
            prompts: prompts.list().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::{PromptCategory, PromptOverrideCache};

    #[test]
    fn builtin_registry_lists_tools_with_schemas() {
        let registry = McpRegistry::builtin();
        let retriever = registry
            .tools()
            .iter()
            .find(|tool| tool.name == "optimizer_vs-retriever")
            .expect("retriever tool registered");

        let properties = retriever.input_schema["properties"]
            .as_object()
            .expect("schema has properties");
        assert!(properties.contains_key("question"));
        assert!(properties.contains_key("top_k"));
        let required = retriever.input_schema["required"].as_array().unwrap();
        assert!(required.iter().any(|field| field == "question"));
    }

    #[test]
    fn duplicate_registration_replaces() {
        let mut registry = McpRegistry::new("test", "0.0.0");
        registry.register_tool::<GradeArgs>("grade", "first");
        registry.register_tool::<GradeArgs>("grade", "second");
        registry.register_resource("config://x", "x", "first", "text/plain");
        registry.register_resource("config://x", "x", "second", "text/plain");

        assert_eq!(registry.tools().len(), 1);
        assert_eq!(registry.tools()[0].description, "second");
        assert_eq!(registry.resources().len(), 1);
        assert_eq!(registry.resources()[0].description, "second");
    }

    #[test]
    fn prompts_reflect_overrides() {
        let registry = McpRegistry::builtin();
        let prompts = PromptService::new(PromptOverrideCache::new());
        prompts
            .set_text(PromptCategory::Ctx, "grade", "only say yes")
            .unwrap();

        let listed = registry.prompts(&prompts);
        let grade = listed
            .iter()
            .find(|prompt| prompt.name == "optimizer_ctx-grade")
            .unwrap();
        assert!(grade.customized);
        assert_eq!(grade.text, "only say yes");

        let status = registry.status(&prompts);
        assert_eq!(status.tools, 4);
        assert_eq!(status.prompts, listed.len());
    }
}
