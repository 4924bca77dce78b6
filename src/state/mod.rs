use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::core::config::{ConfigService, ConfigStore, ServerEnv};
use crate::core::security::{init_api_key, ApiKey};
use crate::db::{connect_persistence, SettingsRepository};
use crate::mcp::McpRegistry;
use crate::prompts::{PromptOverrideCache, PromptService};

pub mod error;

use error::InitializationError;

/// Application state shared by every route.
#[derive(Clone)]
pub struct AppState {
    pub env: Arc<ServerEnv>,
    pub config: ConfigService,
    pub prompts: PromptService,
    pub mcp: McpRegistry,
    pub api_key: ApiKey,
    pub persistence: Option<Arc<dyn SettingsRepository>>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Builds the state for `env`:
    /// 1. loads the configuration document (missing file is fine)
    /// 2. seeds settings, registries and prompt overrides from it
    /// 3. connects persistence when configured and restores saved settings
    pub async fn initialize(env: ServerEnv) -> Result<Arc<Self>, InitializationError> {
        let store = ConfigStore::new();
        store.load_from_file(&env.config_file)?;

        let prompts = PromptService::new(PromptOverrideCache::new());
        let config = ConfigService::bootstrap(&env, &store, prompts.clone());
        let api_key = init_api_key(env.api_key.as_deref());

        let persistence = connect_persistence(&env).await;
        if let Some(repository) = &persistence {
            restore_settings(&config, repository.as_ref()).await;
        }
        if let Some(db) = &env.database {
            let alias = crate::schema::DEFAULT_ALIAS;
            if let Err(err) = config.mark_database_usable(alias, persistence.is_some()) {
                tracing::warn!("Failed to record state of database {} ({}): {}", alias, db.dsn, err);
            }
        }

        Ok(Arc::new(AppState {
            env: Arc::new(env),
            config,
            prompts,
            mcp: McpRegistry::builtin(),
            api_key,
            persistence,
            started_at: Utc::now(),
        }))
    }

    /// Loads `client` from persistence when it is not yet known in memory,
    /// picking up clients saved by another server sharing the database.
    pub async fn restore_client(&self, client: &str) {
        let Some(repository) = &self.persistence else {
            return;
        };
        if self.config.client_settings(client).is_ok() {
            return;
        }
        match repository.load_settings(client).await {
            Ok(Some(settings)) => match self.config.replace_client_settings(settings) {
                Ok(()) => tracing::info!("Restored settings for '{}' from the database", client),
                Err(err) => tracing::warn!("Skipping persisted settings for '{}': {}", client, err),
            },
            Ok(None) => {}
            Err(err) => tracing::warn!("Failed to read persisted settings for '{}': {}", client, err),
        }
    }

    /// Writes `client`'s settings through to persistence, if enabled.
    /// Failures are logged; the in-memory update stands.
    pub async fn persist_settings(&self, client: &str) {
        let Some(repository) = &self.persistence else {
            return;
        };
        let settings = match self.config.client_settings(client) {
            Ok(settings) => settings,
            Err(err) => {
                tracing::warn!("Cannot persist settings for '{}': {}", client, err);
                return;
            }
        };
        if let Err(err) = repository.save_settings(&settings).await {
            tracing::warn!("Failed to persist settings for '{}': {}", client, err);
        }
    }
}

/// Persisted settings win over the file. Rows that no longer validate
/// are skipped.
async fn restore_settings(config: &ConfigService, repository: &dyn SettingsRepository) {
    let saved = match repository.load_all_settings().await {
        Ok(saved) => saved,
        Err(err) => {
            tracing::warn!("Failed to read persisted settings: {}", err);
            return;
        }
    };
    let mut restored = 0;
    for settings in saved {
        let client = settings.client.clone();
        match config.replace_client_settings(settings) {
            Ok(()) => restored += 1,
            Err(err) => tracing::warn!("Skipping persisted settings for '{}': {}", client, err),
        }
    }
    if restored > 0 {
        tracing::info!("Restored settings for {} client(s) from the database", restored);
    }
}
