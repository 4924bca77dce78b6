pub mod configuration;
pub mod database;
pub mod model;
pub mod oci;
pub mod settings;

pub use configuration::Configuration;
pub use database::{DatabaseConfig, VectorStoreInfo};
pub use model::{default_models, ModelConfig, ModelType};
pub use oci::{OciAuthentication, OciProfileConfig};
pub use settings::{
    DistanceMetric, IndexType, LanguageModelSettings, OciSelection, PromptSelection, RagSettings,
    SearchType, Settings, DEFAULT_ALIAS, DEFAULT_CLIENT, SERVER_CLIENT,
};
