//! Prompt registry with runtime text overrides.
//!
//! Prompts are compiled in; administrators may replace the text of any
//! prompt at runtime. The effective text is the override when one exists,
//! otherwise the compiled-in default.

pub mod defaults;
pub mod overrides;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;
pub use defaults::{PromptDefinition, BUILTIN_PROMPTS};
pub use overrides::PromptOverrideCache;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptCategory {
    Sys,
    Ctx,
}

impl PromptCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptCategory::Sys => "sys",
            PromptCategory::Ctx => "ctx",
        }
    }
}

impl fmt::Display for PromptCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptCategory {
    type Err = ApiError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "sys" => Ok(PromptCategory::Sys),
            "ctx" => Ok(PromptCategory::Ctx),
            other => Err(ApiError::BadRequest(format!(
                "Unknown prompt category '{}'",
                other
            ))),
        }
    }
}

/// A prompt as served to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptConfig {
    pub name: String,
    pub category: PromptCategory,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub default_text: String,
    pub text: String,
    pub customized: bool,
}

#[derive(Clone)]
pub struct PromptService {
    definitions: &'static [PromptDefinition],
    overrides: PromptOverrideCache,
}

impl PromptService {
    pub fn new(overrides: PromptOverrideCache) -> Self {
        Self {
            definitions: BUILTIN_PROMPTS,
            overrides,
        }
    }

    pub fn overrides(&self) -> &PromptOverrideCache {
        &self.overrides
    }

    pub fn contains(&self, category: PromptCategory, name: &str) -> bool {
        self.definition(category, name).is_some()
    }

    pub fn list(&self) -> Vec<PromptConfig> {
        self.definitions
            .iter()
            .map(|definition| self.resolve(definition))
            .collect()
    }

    pub fn get(&self, category: PromptCategory, name: &str) -> Result<PromptConfig, ApiError> {
        self.definition(category, name)
            .map(|definition| self.resolve(definition))
            .ok_or_else(|| not_found(category, name))
    }

    pub fn effective_text(&self, category: PromptCategory, name: &str) -> Option<String> {
        self.definition(category, name).map(|definition| {
            self.overrides
                .get_override(&override_key(category, name))
                .unwrap_or_else(|| definition.text.to_string())
        })
    }

    pub fn set_text(
        &self,
        category: PromptCategory,
        name: &str,
        text: &str,
    ) -> Result<PromptConfig, ApiError> {
        if text.trim().is_empty() {
            return Err(ApiError::BadRequest(
                "Prompt text cannot be empty".to_string(),
            ));
        }
        let definition = self
            .definition(category, name)
            .ok_or_else(|| not_found(category, name))?;
        self.overrides
            .set_override(&override_key(category, name), text);
        tracing::info!("Prompt {}/{} customized", category, name);
        Ok(self.resolve(definition))
    }

    pub fn reset(&self, category: PromptCategory, name: &str) -> Result<PromptConfig, ApiError> {
        let definition = self
            .definition(category, name)
            .ok_or_else(|| not_found(category, name))?;
        if self.overrides.clear_override(&override_key(category, name)) {
            tracing::info!("Prompt {}/{} reset to default", category, name);
        }
        Ok(self.resolve(definition))
    }

    pub fn reset_all(&self) {
        self.overrides.clear_all_overrides();
    }

    /// Loads overrides from a configuration document. Entries naming an
    /// unknown prompt are skipped.
    pub fn apply_overrides(&self, overrides: &BTreeMap<String, String>) {
        for (key, text) in overrides {
            let known = key
                .split_once('/')
                .and_then(|(category, name)| {
                    category
                        .parse::<PromptCategory>()
                        .ok()
                        .map(|category| self.contains(category, name))
                })
                .unwrap_or(false);
            if known {
                self.overrides.set_override(key, text);
            } else {
                tracing::warn!("Ignoring override for unknown prompt '{}'", key);
            }
        }
    }

    fn definition(&self, category: PromptCategory, name: &str) -> Option<&'static PromptDefinition> {
        self.definitions
            .iter()
            .find(|definition| definition.category == category && definition.name == name)
    }

    fn resolve(&self, definition: &PromptDefinition) -> PromptConfig {
        let override_text = self
            .overrides
            .get_override(&override_key(definition.category, definition.name));
        let customized = override_text.is_some();
        PromptConfig {
            name: definition.name.to_string(),
            category: definition.category,
            title: definition.title.to_string(),
            description: definition.description.to_string(),
            tags: definition.tags.iter().map(|tag| tag.to_string()).collect(),
            default_text: definition.text.to_string(),
            text: override_text.unwrap_or_else(|| definition.text.to_string()),
            customized,
        }
    }
}

pub fn override_key(category: PromptCategory, name: &str) -> String {
    format!("{}/{}", category, name)
}

fn not_found(category: PromptCategory, name: &str) -> ApiError {
    ApiError::NotFound(format!("Prompt '{}/{}' not found", category, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> PromptService {
        PromptService::new(PromptOverrideCache::new())
    }

    #[test]
    fn override_then_reset_restores_default() {
        let prompts = service();
        let before = prompts.get(PromptCategory::Sys, "basic-example").unwrap();
        assert!(!before.customized);

        let customized = prompts
            .set_text(PromptCategory::Sys, "basic-example", "Be terse.")
            .unwrap();
        assert!(customized.customized);
        assert_eq!(customized.text, "Be terse.");
        assert_eq!(customized.default_text, before.default_text);

        let reset = prompts.reset(PromptCategory::Sys, "basic-example").unwrap();
        assert!(!reset.customized);
        assert_eq!(reset.text, before.text);
    }

    #[test]
    fn categories_are_separate_namespaces() {
        let prompts = service();
        prompts
            .set_text(PromptCategory::Ctx, "basic-example", "ctx override")
            .unwrap();

        let sys = prompts.get(PromptCategory::Sys, "basic-example").unwrap();
        let ctx = prompts.get(PromptCategory::Ctx, "basic-example").unwrap();
        assert!(!sys.customized);
        assert!(ctx.customized);
        assert_eq!(
            prompts
                .effective_text(PromptCategory::Ctx, "basic-example")
                .as_deref(),
            Some("ctx override")
        );
    }

    #[test]
    fn unknown_prompt_is_not_found() {
        let prompts = service();
        assert!(matches!(
            prompts.get(PromptCategory::Sys, "missing"),
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            prompts.set_text(PromptCategory::Sys, "missing", "x"),
            Err(ApiError::NotFound(_))
        ));
        assert_eq!(prompts.effective_text(PromptCategory::Ctx, "missing"), None);
    }

    #[test]
    fn empty_text_is_rejected() {
        let prompts = service();
        let result = prompts.set_text(PromptCategory::Sys, "basic-example", "   ");
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn apply_overrides_skips_unknown_keys() {
        let prompts = service();
        let mut overrides = BTreeMap::new();
        overrides.insert("ctx/grade".to_string(), "grade harder".to_string());
        overrides.insert("ctx/nope".to_string(), "ignored".to_string());
        overrides.insert("bogus".to_string(), "ignored".to_string());

        prompts.apply_overrides(&overrides);

        let snapshot = prompts.overrides().snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot["ctx/grade"], "grade harder");
    }

    #[test]
    fn reset_all_clears_every_override() {
        let prompts = service();
        prompts
            .set_text(PromptCategory::Sys, "tools-example", "a")
            .unwrap();
        prompts.set_text(PromptCategory::Ctx, "rephrase", "b").unwrap();

        prompts.reset_all();

        assert!(prompts.list().iter().all(|prompt| !prompt.customized));
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("SYS".parse::<PromptCategory>().unwrap(), PromptCategory::Sys);
        assert!("other".parse::<PromptCategory>().is_err());
    }
}
