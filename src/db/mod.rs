//! Optional SQL persistence of client settings.
//!
//! Enabled when `AIO_DB_DSN` is set. Any connection or schema failure
//! leaves the server running without persistence.

pub mod sql;

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::config::ServerEnv;
use crate::core::errors::ApiError;
use crate::schema::Settings;
pub use sql::SqlSettingsRepository;

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Inserts or replaces the stored settings of `settings.client`.
    async fn save_settings(&self, settings: &Settings) -> Result<(), ApiError>;

    async fn load_settings(&self, client: &str) -> Result<Option<Settings>, ApiError>;

    async fn load_all_settings(&self) -> Result<Vec<Settings>, ApiError>;
}

/// Opens the settings repository described by the environment, or returns
/// `None` after logging why persistence is unavailable.
pub async fn connect_persistence(env: &ServerEnv) -> Option<Arc<dyn SettingsRepository>> {
    let Some(db_env) = &env.database else {
        tracing::warn!("AIO_DB_DSN not set; settings persistence disabled");
        return None;
    };

    match SqlSettingsRepository::connect(db_env).await {
        Ok(repository) => {
            tracing::info!("Settings persistence enabled");
            Some(Arc::new(repository))
        }
        Err(err) => {
            tracing::warn!(
                "Settings persistence unavailable (user: {}, dsn: {}): {}",
                db_env.username.as_deref().unwrap_or("<none>"),
                db_env.dsn,
                err
            );
            None
        }
    }
}
