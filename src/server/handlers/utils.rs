use serde::Deserialize;

use crate::schema::DEFAULT_CLIENT;

#[derive(Debug, Deserialize, Default)]
pub struct SecretsQuery {
    #[serde(default)]
    pub include_secrets: bool,
}

#[derive(Debug, Deserialize)]
pub struct ClientQuery {
    #[serde(default = "default_client")]
    pub client: String,
    #[serde(default)]
    pub include_secrets: bool,
}

fn default_client() -> String {
    DEFAULT_CLIENT.to_string()
}
