//! HTTP client used by front ends to talk to the server.

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::core::config::{compare_settings, Redact, SettingsDifference};
use crate::core::security::API_KEY_HEADER;
use crate::schema::Configuration;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// Exponential backoff schedule: `initial_delay * multiplier^n` between
/// attempts.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(1),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.initial_delay * self.multiplier.saturating_pow(attempt)
    }
}

#[derive(Clone)]
pub struct ServerClient {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
    retry: RetryPolicy,
}

impl ServerClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Fetches the configuration document of `client`, retrying with
    /// backoff. Returns `None` once every attempt has failed.
    pub async fn fetch_settings(&self, client: &str, include_secrets: bool) -> Option<Configuration> {
        let url = format!("{}/v1/settings", self.base_url);
        let include_secrets = include_secrets.to_string();

        for attempt in 0..self.retry.max_attempts {
            let result = self
                .send_json::<Configuration>(
                    self.http
                        .get(&url)
                        .query(&[("client", client), ("include_secrets", include_secrets.as_str())]),
                )
                .await;

            match result {
                Ok(configuration) => return Some(configuration),
                Err(err) => {
                    let remaining = self.retry.max_attempts - attempt - 1;
                    if remaining == 0 {
                        tracing::error!("Giving up fetching settings: {}", err);
                        break;
                    }
                    let delay = self.retry.delay_for(attempt);
                    tracing::warn!(
                        "Fetching settings failed ({}); retrying in {:?} ({} attempt(s) left)",
                        err,
                        delay,
                        remaining
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }

        None
    }

    /// Compares an uploaded document with the server's copy. Both sides are
    /// normalised into a redacted [`Configuration`] first, matching
    /// `/v1/settings/compare`.
    pub async fn compare_with_server(
        &self,
        client: &str,
        uploaded: &Value,
    ) -> Option<Vec<SettingsDifference>> {
        let uploaded = match serde_json::from_value::<Configuration>(uploaded.clone()) {
            Ok(document) => document.redacted(),
            Err(err) => {
                tracing::warn!("Uploaded settings are not a configuration document: {}", err);
                return None;
            }
        };
        let server = self.fetch_settings(client, false).await?.redacted();

        let uploaded_value = serde_json::to_value(uploaded).ok()?;
        let server_value = serde_json::to_value(server).ok()?;
        Some(compare_settings(&uploaded_value, &server_value))
    }

    /// Polls `/v1/readiness` until it answers or the retry budget runs out.
    pub async fn wait_until_ready(&self) -> bool {
        let url = format!("{}/v1/readiness", self.base_url);
        for attempt in 0..self.retry.max_attempts {
            match self.http.get(&url).send().await {
                Ok(response) if response.status().is_success() => return true,
                Ok(response) => {
                    tracing::debug!("Server not ready: {}", response.status());
                }
                Err(err) => tracing::debug!("Server not reachable: {}", err),
            }
            if attempt + 1 < self.retry.max_attempts {
                tokio::time::sleep(self.retry.delay_for(attempt)).await;
            }
        }
        false
    }

    async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.header(API_KEY_HEADER, &self.api_key).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }
        Ok(response.json::<T>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_exponentially() {
        let policy = RetryPolicy {
            max_attempts: 4,
            initial_delay: Duration::from_millis(100),
            multiplier: 2,
        };
        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(800));
    }

    #[tokio::test]
    async fn unreachable_server_yields_none() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ServerClient::new(&format!("http://{}", addr), "key").with_retry(RetryPolicy {
            max_attempts: 2,
            initial_delay: Duration::from_millis(5),
            multiplier: 2,
        });

        assert!(client.fetch_settings("default", false).await.is_none());
        assert!(!client.wait_until_ready().await);
    }

    #[tokio::test]
    async fn malformed_upload_is_not_compared() {
        let client = ServerClient::new("http://127.0.0.1:9", "key").with_retry(RetryPolicy {
            max_attempts: 1,
            initial_delay: Duration::from_millis(1),
            multiplier: 2,
        });

        let uploaded = serde_json::json!({ "database_configs": "not-a-list" });
        assert!(client.compare_with_server("default", &uploaded).await.is_none());
    }
}
