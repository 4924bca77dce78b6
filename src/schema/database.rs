use serde::{Deserialize, Serialize};

/// A vector store table discovered in a database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorStoreInfo {
    pub vector_store: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub chunk_size: Option<u32>,
    #[serde(default)]
    pub chunk_overlap: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub alias: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub dsn: Option<String>,
    #[serde(default)]
    pub wallet_location: Option<String>,
    #[serde(default = "default_connect_timeout")]
    pub tcp_connect_timeout: u32,
    #[serde(default)]
    pub usable: bool,
    #[serde(default)]
    pub vector_stores: Vec<VectorStoreInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_password: Option<String>,
}

fn default_connect_timeout() -> u32 {
    5
}

impl DatabaseConfig {
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            username: None,
            dsn: None,
            wallet_location: None,
            tcp_connect_timeout: default_connect_timeout(),
            usable: false,
            vector_stores: Vec::new(),
            password: None,
            wallet_password: None,
        }
    }

    /// Applies an uploaded record on top of this one. Secrets missing from
    /// the upload keep their stored value; `usable` and `vector_stores` are
    /// discovered by the server and always kept.
    pub fn merge_update(&mut self, update: DatabaseConfig) {
        let password = update.password.or_else(|| self.password.take());
        let wallet_password = update.wallet_password.or_else(|| self.wallet_password.take());
        *self = DatabaseConfig {
            password,
            wallet_password,
            usable: self.usable,
            vector_stores: std::mem::take(&mut self.vector_stores),
            ..update
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_keeps_secrets_and_discovered_state() {
        let mut stored = DatabaseConfig::new("CORE");
        stored.password = Some("pw".to_string());
        stored.usable = true;
        stored.vector_stores.push(VectorStoreInfo {
            vector_store: "VS_ONE".to_string(),
            alias: None,
            model: None,
            chunk_size: None,
            chunk_overlap: None,
        });

        let mut upload = DatabaseConfig::new("CORE");
        upload.username = Some("renamed".to_string());
        stored.merge_update(upload);

        assert_eq!(stored.username.as_deref(), Some("renamed"));
        assert_eq!(stored.password.as_deref(), Some("pw"));
        assert!(stored.usable);
        assert_eq!(stored.vector_stores.len(), 1);
    }
}
