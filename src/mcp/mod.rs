//! MCP capability registry.
//!
//! Tools and resources are registered explicitly at startup; prompts are
//! served from the prompt registry so overrides show up immediately.

pub mod registry;
pub mod tools;

pub use registry::{McpPromptInfo, McpRegistry, McpResourceInfo, McpStatus, McpToolInfo};
