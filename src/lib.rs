pub mod client;
pub mod core;
pub mod db;
pub mod mcp;
pub mod prompts;
pub mod schema;
pub mod server;
pub mod state;
