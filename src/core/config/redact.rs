use crate::schema::{Configuration, DatabaseConfig, ModelConfig, OciProfileConfig};

/// Removal of secret fields before a record leaves the server.
pub trait Redact {
    fn redacted(&self) -> Self;
}

impl Redact for DatabaseConfig {
    fn redacted(&self) -> Self {
        Self {
            password: None,
            wallet_password: None,
            ..self.clone()
        }
    }
}

impl Redact for OciProfileConfig {
    fn redacted(&self) -> Self {
        Self {
            fingerprint: None,
            key: None,
            pass_phrase: None,
            security_token_file: None,
            ..self.clone()
        }
    }
}

impl Redact for ModelConfig {
    fn redacted(&self) -> Self {
        Self {
            api_key: None,
            ..self.clone()
        }
    }
}

impl Redact for Configuration {
    fn redacted(&self) -> Self {
        Self {
            client_settings: self.client_settings.clone(),
            database_configs: self.database_configs.iter().map(Redact::redacted).collect(),
            model_configs: self.model_configs.iter().map(Redact::redacted).collect(),
            oci_configs: self.oci_configs.iter().map(Redact::redacted).collect(),
            prompt_overrides: self.prompt_overrides.clone(),
        }
    }
}

/// Returns `value` unchanged when secrets were requested, otherwise its
/// redacted form.
pub fn with_secrets<T: Redact + Clone>(value: &T, include_secrets: bool) -> T {
    if include_secrets {
        value.clone()
    } else {
        value.redacted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ModelType, Settings};
    use serde_json::Value;

    fn sample() -> Configuration {
        let mut db = DatabaseConfig::new("DEFAULT");
        db.username = Some("admin".to_string());
        db.password = Some("db-secret".to_string());
        db.wallet_password = Some("wallet-secret".to_string());

        let mut oci = OciProfileConfig::new("DEFAULT");
        oci.tenancy = Some("ocid1.tenancy".to_string());
        oci.fingerprint = Some("aa:bb".to_string());
        oci.key = Some("-----BEGIN KEY-----".to_string());
        oci.pass_phrase = Some("phrase".to_string());

        let model = ModelConfig {
            id: "gpt-4o-mini".to_string(),
            model_type: ModelType::Ll,
            provider: "openai".to_string(),
            enabled: true,
            api_base: None,
            max_input_tokens: None,
            max_chunk_size: None,
            api_key: Some("sk-secret".to_string()),
        };

        Configuration {
            client_settings: Some(Settings::default()),
            database_configs: vec![db],
            model_configs: vec![model],
            oci_configs: vec![oci],
            ..Configuration::default()
        }
    }

    fn contains_string(value: &Value, needle: &str) -> bool {
        match value {
            Value::String(text) => text == needle,
            Value::Array(items) => items.iter().any(|item| contains_string(item, needle)),
            Value::Object(map) => map.values().any(|item| contains_string(item, needle)),
            _ => false,
        }
    }

    #[test]
    fn redaction_drops_every_secret() {
        let redacted = serde_json::to_value(with_secrets(&sample(), false)).unwrap();

        for secret in [
            "db-secret",
            "wallet-secret",
            "aa:bb",
            "-----BEGIN KEY-----",
            "phrase",
            "sk-secret",
        ] {
            assert!(!contains_string(&redacted, secret), "{} leaked", secret);
        }
        assert!(redacted["database_configs"][0].get("password").is_none());
        assert!(redacted["model_configs"][0].get("api_key").is_none());
    }

    #[test]
    fn redaction_keeps_non_secret_fields() {
        let redacted = sample().redacted();
        assert_eq!(redacted.database_configs[0].username.as_deref(), Some("admin"));
        assert_eq!(redacted.oci_configs[0].tenancy.as_deref(), Some("ocid1.tenancy"));
        assert!(redacted.model_configs[0].enabled);
        assert_eq!(redacted.client_settings, Some(Settings::default()));
    }

    #[test]
    fn include_secrets_echoes_values() {
        let full = with_secrets(&sample(), true);
        assert_eq!(full, sample());
    }
}
