use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OciAuthentication {
    #[default]
    ApiKey,
    InstancePrincipal,
    OkeWorkloadIdentity,
    SecurityToken,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OciProfileConfig {
    pub auth_profile: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub tenancy: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub key_file: Option<String>,
    #[serde(default)]
    pub authentication: OciAuthentication,
    #[serde(default)]
    pub genai_compartment_id: Option<String>,
    #[serde(default)]
    pub genai_region: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_phrase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_token_file: Option<String>,
}

impl OciProfileConfig {
    pub fn new(auth_profile: impl Into<String>) -> Self {
        Self {
            auth_profile: auth_profile.into(),
            user: None,
            tenancy: None,
            region: None,
            key_file: None,
            authentication: OciAuthentication::default(),
            genai_compartment_id: None,
            genai_region: None,
            namespace: None,
            fingerprint: None,
            key: None,
            pass_phrase: None,
            security_token_file: None,
        }
    }

    pub fn merge_update(&mut self, update: OciProfileConfig) {
        let fingerprint = update.fingerprint.or_else(|| self.fingerprint.take());
        let key = update.key.or_else(|| self.key.take());
        let pass_phrase = update.pass_phrase.or_else(|| self.pass_phrase.take());
        let security_token_file = update
            .security_token_file
            .or_else(|| self.security_token_file.take());
        *self = OciProfileConfig {
            fingerprint,
            key,
            pass_phrase,
            security_token_file,
            ..update
        };
    }
}
