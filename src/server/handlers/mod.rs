pub mod databases;
pub mod health;
pub mod mcp;
pub mod models;
pub mod oci;
pub mod prompts;
pub mod settings;
pub mod utils;
