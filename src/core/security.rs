use axum::http::HeaderMap;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::core::errors::ApiError;

pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Clone)]
pub struct ApiKey {
    value: String,
}

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    fn matches(&self, candidate: &str) -> bool {
        bool::from(self.value.as_bytes().ct_eq(candidate.as_bytes()))
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKey").field("value", &"****").finish()
    }
}

/// Uses the configured key, or generates one and logs it once so the
/// operator can hand it to clients.
pub fn init_api_key(configured: Option<&str>) -> ApiKey {
    if let Some(key) = configured {
        if !key.trim().is_empty() {
            return ApiKey::new(key);
        }
    }

    let key = Uuid::new_v4().simple().to_string();
    tracing::warn!(
        "AIO_API_KEY is not set; generated API key for this process: {}",
        key
    );
    ApiKey::new(key)
}

/// Missing and wrong keys are rejected identically.
pub fn require_api_key(headers: &HeaderMap, expected: &ApiKey) -> Result<(), ApiError> {
    let header_value = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    if header_value.is_empty() || !expected.matches(header_value) {
        return Err(ApiError::Forbidden);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn require_api_key_accepts_valid_header() {
        let expected = ApiKey::new("secret");
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_static("secret"));

        let result = require_api_key(&headers, &expected);

        assert!(result.is_ok());
    }

    #[test]
    fn require_api_key_rejects_missing_or_invalid_header() {
        let expected = ApiKey::new("secret");
        let headers = HeaderMap::new();

        let missing = require_api_key(&headers, &expected);
        assert!(matches!(missing, Err(ApiError::Forbidden)));

        let mut invalid_headers = HeaderMap::new();
        invalid_headers.insert(API_KEY_HEADER, HeaderValue::from_static("secret-but-longer"));
        let invalid = require_api_key(&invalid_headers, &expected);
        assert!(matches!(invalid, Err(ApiError::Forbidden)));
    }

    #[test]
    fn require_api_key_rejects_non_utf8_header_value() {
        let expected = ApiKey::new("secret");
        let mut headers = HeaderMap::new();
        let non_utf8 = HeaderValue::from_bytes(&[0xFF, 0xFE, 0xFD])
            .expect("header value bytes should be accepted");
        headers.insert(API_KEY_HEADER, non_utf8);

        let result = require_api_key(&headers, &expected);

        assert!(matches!(result, Err(ApiError::Forbidden)));
    }

    #[test]
    fn init_api_key_generates_when_unset() {
        let configured = init_api_key(Some("from-env"));
        assert_eq!(configured.value(), "from-env");

        let generated = init_api_key(None);
        assert_eq!(generated.value().len(), 32);
        assert_ne!(generated.value(), init_api_key(Some("  ")).value());
    }

    #[test]
    fn debug_output_hides_the_key() {
        let key = ApiKey::new("secret");
        assert!(!format!("{:?}", key).contains("secret"));
    }
}
