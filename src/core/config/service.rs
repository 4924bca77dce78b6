use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::env::ServerEnv;
use super::redact::with_secrets;
use super::store::ConfigStore;
use super::validation::{validate_configuration, validate_settings};
use crate::core::errors::ApiError;
use crate::prompts::PromptService;
use crate::schema::{
    default_models, Configuration, DatabaseConfig, ModelConfig, ModelType, OciProfileConfig,
    Settings, DEFAULT_ALIAS, DEFAULT_CLIENT, SERVER_CLIENT,
};

#[derive(Default)]
struct ConfigState {
    clients: BTreeMap<String, Settings>,
    databases: Vec<DatabaseConfig>,
    models: Vec<ModelConfig>,
    oci_profiles: Vec<OciProfileConfig>,
}

/// In-memory owner of client settings and the database, model and OCI
/// registries. Seeded once from the [`ConfigStore`] and the environment.
#[derive(Clone)]
pub struct ConfigService {
    prompts: PromptService,
    config_file: PathBuf,
    state: Arc<RwLock<ConfigState>>,
}

impl ConfigService {
    pub fn bootstrap(env: &ServerEnv, store: &ConfigStore, prompts: PromptService) -> Self {
        let document = store.get().map(|doc| (*doc).clone()).unwrap_or_default();

        let template = document.client_settings.clone().unwrap_or_default();
        let mut clients = BTreeMap::new();
        for client in [DEFAULT_CLIENT, SERVER_CLIENT] {
            clients.insert(client.to_string(), template.for_client(client));
        }

        let mut databases = document.database_configs.clone();
        if !databases.iter().any(|db| db.alias == DEFAULT_ALIAS) {
            databases.insert(0, DatabaseConfig::new(DEFAULT_ALIAS));
        }
        if let Some(db_env) = &env.database {
            if let Some(default_db) = databases.iter_mut().find(|db| db.alias == DEFAULT_ALIAS) {
                default_db.dsn = Some(db_env.dsn.clone());
                if db_env.username.is_some() {
                    default_db.username = db_env.username.clone();
                }
                if db_env.password.is_some() {
                    default_db.password = db_env.password.clone();
                }
                if db_env.wallet_password.is_some() {
                    default_db.wallet_password = db_env.wallet_password.clone();
                }
            }
        }

        let models = if document.model_configs.is_empty() {
            default_models()
        } else {
            document.model_configs.clone()
        };

        let oci_profiles = if document.oci_configs.is_empty() {
            vec![OciProfileConfig::new(DEFAULT_ALIAS)]
        } else {
            document.oci_configs.clone()
        };

        prompts.apply_overrides(&document.prompt_overrides);

        tracing::info!(
            "Configuration ready: {} database(s), {} model(s), {} OCI profile(s)",
            databases.len(),
            models.len(),
            oci_profiles.len()
        );

        Self {
            prompts,
            config_file: env.config_file.clone(),
            state: Arc::new(RwLock::new(ConfigState {
                clients,
                databases,
                models,
                oci_profiles,
            })),
        }
    }

    pub fn clients(&self) -> Result<Vec<String>, ApiError> {
        let state = self.state.read().map_err(ApiError::internal)?;
        Ok(state.clients.keys().cloned().collect())
    }

    pub fn client_settings(&self, client: &str) -> Result<Settings, ApiError> {
        let state = self.state.read().map_err(ApiError::internal)?;
        state
            .clients
            .get(client)
            .cloned()
            .ok_or_else(|| client_not_found(client))
    }

    /// Creates settings for a new client as a copy of the `default` client.
    pub fn create_client(&self, client: &str) -> Result<Settings, ApiError> {
        if client.trim().is_empty() {
            return Err(ApiError::BadRequest("Client name cannot be empty".to_string()));
        }
        let mut state = self.state.write().map_err(ApiError::internal)?;
        if state.clients.contains_key(client) {
            return Err(ApiError::Conflict(format!(
                "Settings for client '{}' already exist",
                client
            )));
        }
        let settings = state
            .clients
            .get(DEFAULT_CLIENT)
            .map(|template| template.for_client(client))
            .unwrap_or_else(|| Settings::new(client));
        state.clients.insert(client.to_string(), settings.clone());
        tracing::info!("Created settings for client '{}'", client);
        Ok(settings)
    }

    /// Deep-merges a partial settings document into the client's settings.
    pub fn update_client_settings(&self, client: &str, patch: &Value) -> Result<Settings, ApiError> {
        if !patch.is_object() {
            return Err(ApiError::BadRequest(
                "Settings update must be a JSON object".to_string(),
            ));
        }
        let mut state = self.state.write().map_err(ApiError::internal)?;
        let current = state
            .clients
            .get(client)
            .ok_or_else(|| client_not_found(client))?;
        let current_value = serde_json::to_value(current).map_err(ApiError::internal)?;
        let merged = deep_merge(&current_value, patch);
        let updated = Settings::from_json(client, merged)
            .map_err(|err| ApiError::BadRequest(format!("Invalid settings: {}", err)))?;
        validate_settings(&updated)?;
        state.clients.insert(client.to_string(), updated.clone());
        Ok(updated)
    }

    pub fn replace_client_settings(&self, settings: Settings) -> Result<(), ApiError> {
        validate_settings(&settings)?;
        let mut state = self.state.write().map_err(ApiError::internal)?;
        state.clients.insert(settings.client.clone(), settings);
        Ok(())
    }

    /// The configuration document as seen by `client`.
    pub fn configuration(&self, client: &str, include_secrets: bool) -> Result<Configuration, ApiError> {
        let state = self.state.read().map_err(ApiError::internal)?;
        let settings = state
            .clients
            .get(client)
            .cloned()
            .ok_or_else(|| client_not_found(client))?;
        let configuration = Configuration {
            client_settings: Some(settings),
            database_configs: state.databases.clone(),
            model_configs: state.models.clone(),
            oci_configs: state.oci_profiles.clone(),
            prompt_overrides: self.prompts.overrides().snapshot(),
        };
        Ok(with_secrets(&configuration, include_secrets))
    }

    /// Applies an uploaded configuration document. Records are upserted by
    /// key; secrets absent from the upload keep their stored values.
    pub fn apply_configuration(
        &self,
        client: &str,
        document: Configuration,
    ) -> Result<Settings, ApiError> {
        validate_configuration(&document)?;
        let mut state = self.state.write().map_err(ApiError::internal)?;

        let settings = match document.client_settings {
            Some(uploaded) => uploaded.for_client(client),
            None => state
                .clients
                .get(client)
                .cloned()
                .unwrap_or_else(|| Settings::new(client)),
        };
        state.clients.insert(client.to_string(), settings.clone());

        for update in document.database_configs {
            match state.databases.iter_mut().find(|db| db.alias == update.alias) {
                Some(existing) => existing.merge_update(update),
                None => state.databases.push(update),
            }
        }
        for update in document.model_configs {
            let key = update.key();
            match state.models.iter_mut().find(|model| model.key() == key) {
                Some(existing) => existing.merge_update(update),
                None => state.models.push(update),
            }
        }
        for update in document.oci_configs {
            match state
                .oci_profiles
                .iter_mut()
                .find(|profile| profile.auth_profile == update.auth_profile)
            {
                Some(existing) => existing.merge_update(update),
                None => state.oci_profiles.push(update),
            }
        }
        self.prompts.apply_overrides(&document.prompt_overrides);

        tracing::info!("Applied uploaded configuration for client '{}'", client);
        Ok(settings)
    }

    pub fn databases(&self, include_secrets: bool) -> Result<Vec<DatabaseConfig>, ApiError> {
        let state = self.state.read().map_err(ApiError::internal)?;
        Ok(state
            .databases
            .iter()
            .map(|db| with_secrets(db, include_secrets))
            .collect())
    }

    pub fn database(&self, alias: &str, include_secrets: bool) -> Result<DatabaseConfig, ApiError> {
        let state = self.state.read().map_err(ApiError::internal)?;
        state
            .databases
            .iter()
            .find(|db| db.alias == alias)
            .map(|db| with_secrets(db, include_secrets))
            .ok_or_else(|| ApiError::NotFound(format!("Database '{}' not found", alias)))
    }

    /// Merges a partial record into the database `alias`. Fields missing
    /// from `patch` keep their stored value; `usable` and `vector_stores`
    /// are owned by the server and never taken from the body.
    pub fn update_database(&self, alias: &str, patch: &Value) -> Result<DatabaseConfig, ApiError> {
        ensure_patch_key(patch, "alias", alias)?;
        let mut state = self.state.write().map_err(ApiError::internal)?;
        let existing = state
            .databases
            .iter_mut()
            .find(|db| db.alias == alias)
            .ok_or_else(|| ApiError::NotFound(format!("Database '{}' not found", alias)))?;
        let mut updated: DatabaseConfig = merge_record(&*existing, patch)?;
        updated.usable = existing.usable;
        updated.vector_stores = std::mem::take(&mut existing.vector_stores);
        *existing = updated;
        tracing::info!("Updated database '{}'", alias);
        Ok(with_secrets(&*existing, false))
    }

    /// Records whether the database behind `alias` accepted a connection.
    pub fn mark_database_usable(&self, alias: &str, usable: bool) -> Result<(), ApiError> {
        let mut state = self.state.write().map_err(ApiError::internal)?;
        if let Some(db) = state.databases.iter_mut().find(|db| db.alias == alias) {
            db.usable = usable;
        }
        Ok(())
    }

    pub fn oci_profiles(&self, include_secrets: bool) -> Result<Vec<OciProfileConfig>, ApiError> {
        let state = self.state.read().map_err(ApiError::internal)?;
        Ok(state
            .oci_profiles
            .iter()
            .map(|profile| with_secrets(profile, include_secrets))
            .collect())
    }

    pub fn oci_profile(
        &self,
        auth_profile: &str,
        include_secrets: bool,
    ) -> Result<OciProfileConfig, ApiError> {
        let state = self.state.read().map_err(ApiError::internal)?;
        state
            .oci_profiles
            .iter()
            .find(|profile| profile.auth_profile == auth_profile)
            .map(|profile| with_secrets(profile, include_secrets))
            .ok_or_else(|| oci_not_found(auth_profile))
    }

    pub fn update_oci_profile(
        &self,
        auth_profile: &str,
        patch: &Value,
    ) -> Result<OciProfileConfig, ApiError> {
        ensure_patch_key(patch, "auth_profile", auth_profile)?;
        let mut state = self.state.write().map_err(ApiError::internal)?;
        let existing = state
            .oci_profiles
            .iter_mut()
            .find(|profile| profile.auth_profile == auth_profile)
            .ok_or_else(|| oci_not_found(auth_profile))?;
        *existing = merge_record(&*existing, patch)?;
        tracing::info!("Updated OCI profile '{}'", auth_profile);
        Ok(with_secrets(&*existing, false))
    }

    pub fn models(
        &self,
        model_type: Option<ModelType>,
        include_secrets: bool,
    ) -> Result<Vec<ModelConfig>, ApiError> {
        let state = self.state.read().map_err(ApiError::internal)?;
        Ok(state
            .models
            .iter()
            .filter(|model| model_type.map_or(true, |kind| model.model_type == kind))
            .map(|model| with_secrets(model, include_secrets))
            .collect())
    }

    pub fn model(&self, provider: &str, id: &str, include_secrets: bool) -> Result<ModelConfig, ApiError> {
        let state = self.state.read().map_err(ApiError::internal)?;
        state
            .models
            .iter()
            .find(|model| model.provider == provider && model.id == id)
            .map(|model| with_secrets(model, include_secrets))
            .ok_or_else(|| model_not_found(provider, id))
    }

    pub fn update_model(
        &self,
        provider: &str,
        id: &str,
        patch: &Value,
    ) -> Result<ModelConfig, ApiError> {
        ensure_patch_key(patch, "provider", provider)?;
        ensure_patch_key(patch, "id", id)?;
        let mut state = self.state.write().map_err(ApiError::internal)?;
        let existing = state
            .models
            .iter_mut()
            .find(|model| model.provider == provider && model.id == id)
            .ok_or_else(|| model_not_found(provider, id))?;
        *existing = merge_record(&*existing, patch)?;
        tracing::info!("Updated model '{}/{}'", provider, id);
        Ok(with_secrets(&*existing, false))
    }

    /// Writes the full document for `client`, secrets included, to the
    /// configuration file.
    pub fn save_to_file(&self, client: &str) -> Result<PathBuf, ApiError> {
        let configuration = self.configuration(client, true)?;
        let contents = serde_json::to_string_pretty(&configuration).map_err(ApiError::internal)?;

        let path = self.config_file.clone();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(ApiError::internal)?;
        }

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&path).map_err(ApiError::internal)?;
        // An existing file keeps its old mode on open.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(ApiError::internal)?;
        }
        file.write_all(contents.as_bytes())
            .map_err(ApiError::internal)?;

        tracing::info!("Saved configuration for client '{}' to {}", client, path.display());
        Ok(path)
    }
}

/// Objects merge key by key; any other patch value replaces the base.
fn deep_merge(base: &Value, patch: &Value) -> Value {
    let mut merged = base.clone();
    merge_into(&mut merged, patch);
    merged
}

fn merge_into(target: &mut Value, patch: &Value) {
    if let (Value::Object(fields), Value::Object(updates)) = (&mut *target, patch) {
        for (key, update) in updates {
            match fields.get_mut(key) {
                Some(slot) => merge_into(slot, update),
                None => {
                    fields.insert(key.clone(), update.clone());
                }
            }
        }
        return;
    }
    *target = patch.clone();
}

/// Applies a partial JSON body to a stored registry record.
fn merge_record<T: Serialize + DeserializeOwned>(existing: &T, patch: &Value) -> Result<T, ApiError> {
    let current = serde_json::to_value(existing).map_err(ApiError::internal)?;
    serde_json::from_value(deep_merge(&current, patch))
        .map_err(|err| ApiError::BadRequest(format!("Invalid record: {}", err)))
}

/// A patch body may omit its key; when present it must name the path's record.
fn ensure_patch_key(patch: &Value, field: &str, expected: &str) -> Result<(), ApiError> {
    if !patch.is_object() {
        return Err(ApiError::BadRequest("Update must be a JSON object".to_string()));
    }
    match patch.get(field) {
        None => Ok(()),
        Some(Value::String(actual)) => ensure_key_matches(field, expected, actual),
        Some(_) => Err(ApiError::BadRequest(format!("Body {} must be a string", field))),
    }
}

fn ensure_key_matches(field: &str, expected: &str, actual: &str) -> Result<(), ApiError> {
    if expected == actual {
        return Ok(());
    }
    Err(ApiError::BadRequest(format!(
        "Body {} '{}' does not match path '{}'",
        field, actual, expected
    )))
}

fn client_not_found(client: &str) -> ApiError {
    ApiError::NotFound(format!("Settings for client '{}' not found", client))
}

fn oci_not_found(auth_profile: &str) -> ApiError {
    ApiError::NotFound(format!("OCI profile '{}' not found", auth_profile))
}

fn model_not_found(provider: &str, id: &str) -> ApiError {
    ApiError::NotFound(format!("Model '{}/{}' not found", provider, id))
}
