use super::PromptCategory;

/// A prompt compiled into the server.
#[derive(Debug, Clone, Copy)]
pub struct PromptDefinition {
    pub name: &'static str,
    pub category: PromptCategory,
    pub title: &'static str,
    pub description: &'static str,
    pub tags: &'static [&'static str],
    pub text: &'static str,
}

pub const BUILTIN_PROMPTS: &[PromptDefinition] = &[
    PromptDefinition {
        name: "basic-example",
        category: PromptCategory::Sys,
        title: "Basic Example",
        description: "General purpose assistant without retrieval.",
        tags: &["chat"],
        text: "You are a friendly, helpful assistant. Answer the user's question as accurately \
               and concisely as you can. If you do not know the answer, say so.",
    },
    PromptDefinition {
        name: "vector-search-example",
        category: PromptCategory::Sys,
        title: "Vector Search Example",
        description: "Assistant that answers strictly from retrieved documents.",
        tags: &["rag", "vector-search"],
        text: "You are an assistant for question-answering tasks. Use only the retrieved \
               documents supplied in the context to answer. If the documents do not contain \
               the answer, reply that you cannot answer from the available documents. Keep \
               answers to at most three sentences.",
    },
    PromptDefinition {
        name: "tools-example",
        category: PromptCategory::Sys,
        title: "Tools Example",
        description: "Assistant allowed to call registered MCP tools.",
        tags: &["mcp", "tools"],
        text: "You are a helpful assistant with access to tools. Call a tool only when it is \
               needed to answer the question, pass arguments exactly as described by the tool \
               schema, and summarise tool results for the user.",
    },
    PromptDefinition {
        name: "basic-example",
        category: PromptCategory::Ctx,
        title: "Basic Example",
        description: "Rewrites a follow-up question into a standalone query.",
        tags: &["rag", "rephrase"],
        text: "Given the chat history and the latest user question, which might reference \
               earlier turns, rewrite the question so it can be understood without the chat \
               history. Do not answer the question; return only the rewritten question.",
    },
    PromptDefinition {
        name: "rephrase",
        category: PromptCategory::Ctx,
        title: "Rephrase for Search",
        description: "Turns a question into a search-friendly query.",
        tags: &["rag", "rephrase"],
        text: "Rephrase the user's question into a concise search query that captures its key \
               terms. Return only the query.",
    },
    PromptDefinition {
        name: "grade",
        category: PromptCategory::Ctx,
        title: "Grade Documents",
        description: "Judges whether retrieved documents are relevant.",
        tags: &["rag", "grading"],
        text: "You are a grader assessing the relevance of retrieved documents to a user \
               question. If a document contains keywords or meaning related to the question, \
               grade it as relevant. Respond with a single word: yes or no.",
    },
];
