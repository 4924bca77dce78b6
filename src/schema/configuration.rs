use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::database::DatabaseConfig;
use super::model::ModelConfig;
use super::oci::OciProfileConfig;
use super::settings::Settings;

/// The configuration document, as stored on disk and exchanged through the
/// settings upload/download routes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_settings: Option<Settings>,
    pub database_configs: Vec<DatabaseConfig>,
    pub model_configs: Vec<ModelConfig>,
    pub oci_configs: Vec<OciProfileConfig>,
    /// Prompt text overrides keyed by `<category>/<name>`.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub prompt_overrides: BTreeMap<String, String>,
}
