use std::env;
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 8000;

/// Database connection details taken from `AIO_DB_*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseEnv {
    pub username: Option<String>,
    pub password: Option<String>,
    pub dsn: String,
    pub wallet_password: Option<String>,
}

/// Process configuration read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEnv {
    pub api_key: Option<String>,
    pub url_prefix: String,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
    pub port: u16,
    pub config_file: PathBuf,
    pub database: Option<DatabaseEnv>,
    /// Problems found while reading the environment, logged once logging
    /// is up.
    pub warnings: Vec<String>,
}

impl ServerEnv {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source. Blank
    /// values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let url_prefix = get("AIO_URL_PREFIX")
            .or_else(|| get("AIO_SERVER_URL_PREFIX"))
            .map(|prefix| normalize_prefix(&prefix))
            .unwrap_or_default();

        let mut warnings = Vec::new();
        let port = match get("AIO_SERVER_PORT") {
            Some(raw) => raw.parse::<u16>().unwrap_or_else(|_| {
                warnings.push(format!(
                    "Invalid AIO_SERVER_PORT '{}'; using {}",
                    raw, DEFAULT_PORT
                ));
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        let config_file = get("AIO_CONFIG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(default_config_file);

        let database = get("AIO_DB_DSN").map(|dsn| DatabaseEnv {
            username: get("AIO_DB_USERNAME"),
            password: get("AIO_DB_PASSWORD"),
            dsn,
            wallet_password: get("AIO_DB_WALLET_PASSWORD"),
        });

        Self {
            api_key: get("AIO_API_KEY"),
            url_prefix,
            log_level: get("AIO_LOG_LEVEL"),
            log_dir: get("AIO_LOG_DIR").map(PathBuf::from),
            port,
            config_file,
            database,
            warnings,
        }
    }

    pub fn log_warnings(&self) {
        for warning in &self.warnings {
            tracing::warn!("{}", warning);
        }
    }
}

fn default_config_file() -> PathBuf {
    env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("etc")
        .join("configuration.json")
}

/// `aio/` and `/aio/` both become `/aio`; `/` becomes empty.
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
