use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, RwLock};

use super::validation::validate_configuration;
use crate::core::errors::ConfigError;
use crate::schema::Configuration;

/// Holder of the configuration document read at startup.
///
/// Loading and resetting are serialised by `load_lock`; the document is
/// published only after it has been fully parsed and validated.
#[derive(Clone, Default)]
pub struct ConfigStore {
    document: Arc<RwLock<Option<Arc<Configuration>>>>,
    load_lock: Arc<Mutex<()>>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the document at `path` once. A missing file leaves the store
    /// empty; a malformed or invalid file is an error.
    pub fn load_from_file(&self, path: &Path) -> Result<(), ConfigError> {
        let _guard = self
            .load_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if self.get().is_some() {
            tracing::debug!("Configuration already loaded; skipping {}", path.display());
            return Ok(());
        }

        if !path.exists() {
            tracing::warn!(
                "Configuration file {} not found; starting with defaults",
                path.display()
            );
            return Ok(());
        }

        let shown = path.display().to_string();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: shown.clone(),
            source,
        })?;
        let configuration: Configuration =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: shown.clone(),
                source,
            })?;
        validate_configuration(&configuration).map_err(|err| ConfigError::Validation {
            path: shown.clone(),
            message: err.to_string(),
        })?;

        *self
            .document
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Arc::new(configuration));
        tracing::info!("Loaded configuration from {}", shown);
        Ok(())
    }

    pub fn get(&self) -> Option<Arc<Configuration>> {
        self.document
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn reset(&self) {
        let _guard = self
            .load_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *self
            .document
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn missing_file_leaves_store_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new();

        store
            .load_from_file(&dir.path().join("absent.json"))
            .expect("missing file is not an error");

        assert!(store.get().is_none());
    }

    #[test]
    fn load_is_idempotent() {
        let file = write_config(r#"{"client_settings": {"ll_model": {"temperature": 0.1}}}"#);
        let store = ConfigStore::new();

        store.load_from_file(file.path()).unwrap();
        let first = store.get().expect("loaded");
        store.load_from_file(file.path()).unwrap();
        let second = store.get().expect("still loaded");

        assert!(Arc::ptr_eq(&first, &second));
        let settings = first.client_settings.as_ref().unwrap();
        assert_eq!(settings.ll_model.temperature, 0.1);
    }

    #[test]
    fn reset_clears_document() {
        let file = write_config("{}");
        let store = ConfigStore::new();
        store.load_from_file(file.path()).unwrap();
        assert!(store.get().is_some());

        store.reset();

        assert!(store.get().is_none());
    }

    #[test]
    fn malformed_json_fails_loudly() {
        let file = write_config("{ not json");
        let store = ConfigStore::new();

        let result = store.load_from_file(file.path());

        match result {
            Err(ConfigError::Parse { path, .. }) => {
                assert_eq!(path, file.path().display().to_string())
            }
            other => panic!("expected parse error, got {:?}", other),
        }
        assert!(store.get().is_none());
    }

    #[test]
    fn schema_violation_fails_loudly() {
        let file = write_config(r#"{"database_configs": [{"alias": 42}]}"#);
        let store = ConfigStore::new();
        assert!(matches!(
            store.load_from_file(file.path()),
            Err(ConfigError::Parse { .. })
        ));

        let file = write_config(r#"{"client_settings": {"ll_model": {"temperature": 9.0}}}"#);
        assert!(matches!(
            store.load_from_file(file.path()),
            Err(ConfigError::Validation { .. })
        ));
    }
}
