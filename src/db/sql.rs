use async_trait::async_trait;
use sqlx::{sqlite::SqlitePoolOptions, Row, SqlitePool};

use super::SettingsRepository;
use crate::core::config::DatabaseEnv;
use crate::core::errors::ApiError;
use crate::schema::Settings;

pub const TABLE_PREFIX: &str = "AIO";

#[derive(Clone)]
pub struct SqlSettingsRepository {
    pool: SqlitePool,
}

impl SqlSettingsRepository {
    pub async fn connect(db: &DatabaseEnv) -> Result<Self, ApiError> {
        let conn_str = connection_string(&db.dsn);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&conn_str)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to connect to database: {}", e)))?;

        if let Err(err) = init_schema(&pool).await {
            pool.close().await;
            return Err(err);
        }

        Ok(Self { pool })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Plain paths are opened as SQLite files, created on first use.
fn connection_string(dsn: &str) -> String {
    if dsn.starts_with("sqlite:") {
        dsn.to_string()
    } else {
        format!("sqlite://{}?mode=rwc", dsn)
    }
}

async fn init_schema(pool: &SqlitePool) -> Result<(), ApiError> {
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(pool)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to enable foreign keys: {}", e)))?;

    let statements = [
        format!(
            "CREATE TABLE IF NOT EXISTS {p}_SETTINGS (
                client TEXT PRIMARY KEY,
                settings JSON NOT NULL,
                created DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated DATETIME
            )",
            p = TABLE_PREFIX
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {p}_TESTSETS (
                tid TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                created DATETIME DEFAULT CURRENT_TIMESTAMP,
                UNIQUE (name, created)
            )",
            p = TABLE_PREFIX
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {p}_TESTSET_QA (
                tid TEXT NOT NULL,
                qa_data JSON NOT NULL,
                FOREIGN KEY(tid) REFERENCES {p}_TESTSETS(tid) ON DELETE CASCADE
            )",
            p = TABLE_PREFIX
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {p}_EVALUATIONS (
                eid TEXT PRIMARY KEY,
                tid TEXT NOT NULL,
                evaluated DATETIME DEFAULT CURRENT_TIMESTAMP,
                correctness REAL,
                settings JSON,
                rag_report BLOB,
                FOREIGN KEY(tid) REFERENCES {p}_TESTSETS(tid) ON DELETE CASCADE
            )",
            p = TABLE_PREFIX
        ),
    ];

    for statement in &statements {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to init schema: {}", e)))?;
    }

    Ok(())
}

#[async_trait]
impl SettingsRepository for SqlSettingsRepository {
    async fn save_settings(&self, settings: &Settings) -> Result<(), ApiError> {
        let payload = serde_json::to_string(settings).map_err(ApiError::internal)?;
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(&format!(
            "INSERT INTO {p}_SETTINGS (client, settings, updated) VALUES (?, ?, ?)
             ON CONFLICT(client) DO UPDATE SET settings = excluded.settings, updated = excluded.updated",
            p = TABLE_PREFIX
        ))
        .bind(&settings.client)
        .bind(payload)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to save settings: {}", e)))?;

        Ok(())
    }

    async fn load_settings(&self, client: &str) -> Result<Option<Settings>, ApiError> {
        let row = sqlx::query(&format!(
            "SELECT settings FROM {p}_SETTINGS WHERE client = ?",
            p = TABLE_PREFIX
        ))
        .bind(client)
        .fetch_optional(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let payload: String = row.try_get("settings").map_err(ApiError::internal)?;
        parse_settings(client, &payload).map(Some)
    }

    async fn load_all_settings(&self) -> Result<Vec<Settings>, ApiError> {
        let rows = sqlx::query(&format!(
            "SELECT client, settings FROM {p}_SETTINGS ORDER BY client",
            p = TABLE_PREFIX
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        let mut all = Vec::with_capacity(rows.len());
        for row in rows {
            let client: String = row.try_get("client").map_err(ApiError::internal)?;
            let payload: String = row.try_get("settings").map_err(ApiError::internal)?;
            match parse_settings(&client, &payload) {
                Ok(settings) => all.push(settings),
                Err(err) => tracing::warn!("Skipping stored settings row: {}", err),
            }
        }
        Ok(all)
    }
}

fn parse_settings(client: &str, payload: &str) -> Result<Settings, ApiError> {
    let value = serde_json::from_str(payload).map_err(ApiError::internal)?;
    Settings::from_json(client, value).map_err(|e| {
        ApiError::internal(format!("Stored settings for '{}' are invalid: {}", client, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_env(dir: &tempfile::TempDir) -> DatabaseEnv {
        DatabaseEnv {
            username: Some("admin".to_string()),
            password: None,
            dsn: dir.path().join("aio.db").to_string_lossy().to_string(),
            wallet_password: None,
        }
    }

    #[test]
    fn plain_dsn_becomes_sqlite_url() {
        assert_eq!(connection_string("/tmp/a.db"), "sqlite:///tmp/a.db?mode=rwc");
        assert_eq!(connection_string("sqlite::memory:"), "sqlite::memory:");
    }

    #[tokio::test]
    async fn save_then_load_settings() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqlSettingsRepository::connect(&db_env(&dir)).await.unwrap();

        let mut settings = Settings::new("alice");
        settings.rag.enabled = true;
        repo.save_settings(&settings).await.unwrap();

        settings.rag.top_k = 6;
        repo.save_settings(&settings).await.unwrap();

        let loaded = repo.load_settings("alice").await.unwrap();
        assert_eq!(loaded, Some(settings));
        assert_eq!(repo.load_settings("bob").await.unwrap(), None);
        repo.close().await;
    }

    #[tokio::test]
    async fn schema_creation_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let first = SqlSettingsRepository::connect(&db_env(&dir)).await.unwrap();
        first.save_settings(&Settings::new("server")).await.unwrap();
        first.close().await;

        let second = SqlSettingsRepository::connect(&db_env(&dir)).await.unwrap();
        let all = second.load_all_settings().await.unwrap();
        assert_eq!(all, vec![Settings::new("server")]);

        let tables: Vec<String> = sqlx::query(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name LIKE 'AIO_%' ORDER BY name",
        )
        .fetch_all(&second.pool)
        .await
        .unwrap()
        .into_iter()
        .map(|row| row.get::<String, _>("name"))
        .collect();
        assert_eq!(
            tables,
            vec!["AIO_EVALUATIONS", "AIO_SETTINGS", "AIO_TESTSETS", "AIO_TESTSET_QA"]
        );
    }

    #[tokio::test]
    async fn corrupt_rows_do_not_hide_valid_ones() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqlSettingsRepository::connect(&db_env(&dir)).await.unwrap();

        let mut server = Settings::new("server");
        server.ll_model.max_tokens = 777;
        repo.save_settings(&server).await.unwrap();
        for (client, payload) in [("broken", "{not json"), ("zzz", r#"{"rag":{"top_k":"many"}}"#)] {
            sqlx::query("INSERT INTO AIO_SETTINGS (client, settings) VALUES (?, ?)")
                .bind(client)
                .bind(payload)
                .execute(&repo.pool)
                .await
                .unwrap();
        }

        assert_eq!(repo.load_all_settings().await.unwrap(), vec![server]);
        assert!(repo.load_settings("zzz").await.is_err());
    }

    #[tokio::test]
    async fn unreachable_database_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let env = DatabaseEnv {
            username: None,
            password: None,
            dsn: dir
                .path()
                .join("missing-dir")
                .join("aio.db")
                .to_string_lossy()
                .to_string(),
            wallet_password: None,
        };
        assert!(SqlSettingsRepository::connect(&env).await.is_err());
    }
}
