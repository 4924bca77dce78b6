use std::collections::HashSet;
use std::fmt::Display;

use crate::core::errors::ApiError;
use crate::prompts::{PromptCategory, BUILTIN_PROMPTS};
use crate::schema::{Configuration, Settings};

pub fn validate_configuration(config: &Configuration) -> Result<(), ApiError> {
    if let Some(settings) = &config.client_settings {
        validate_settings_at("client_settings", settings)?;
    }

    validate_unique_keys(
        "database_configs",
        "alias",
        config.database_configs.iter().map(|db| db.alias.clone()),
    )?;
    validate_unique_keys(
        "oci_configs",
        "auth_profile",
        config
            .oci_configs
            .iter()
            .map(|profile| profile.auth_profile.clone()),
    )?;
    validate_unique_keys(
        "model_configs",
        "provider/id",
        config.model_configs.iter().map(|model| model.key()),
    )?;

    for (index, db) in config.database_configs.iter().enumerate() {
        validate_range(
            &format!("database_configs[{}].tcp_connect_timeout", index),
            db.tcp_connect_timeout,
            1,
            600,
        )?;
    }

    Ok(())
}

pub fn validate_settings(settings: &Settings) -> Result<(), ApiError> {
    validate_settings_at("settings", settings)
}

fn validate_settings_at(prefix: &str, settings: &Settings) -> Result<(), ApiError> {
    let llm = &settings.ll_model;
    validate_range(&format!("{}.ll_model.temperature", prefix), llm.temperature, 0.0, 2.0)?;
    validate_range(&format!("{}.ll_model.top_p", prefix), llm.top_p, 0.0, 1.0)?;
    validate_range(
        &format!("{}.ll_model.frequency_penalty", prefix),
        llm.frequency_penalty,
        -2.0,
        2.0,
    )?;
    validate_range(
        &format!("{}.ll_model.presence_penalty", prefix),
        llm.presence_penalty,
        -2.0,
        2.0,
    )?;
    validate_range(
        &format!("{}.ll_model.max_tokens", prefix),
        llm.max_tokens,
        1,
        u32::MAX,
    )?;

    let rag = &settings.rag;
    validate_range(&format!("{}.rag.top_k", prefix), rag.top_k, 1, 10_000)?;
    validate_range(
        &format!("{}.rag.score_threshold", prefix),
        rag.score_threshold,
        0.0,
        1.0,
    )?;
    validate_range(&format!("{}.rag.lambda_mult", prefix), rag.lambda_mult, 0.0, 1.0)?;
    if rag.fetch_k < rag.top_k {
        return Err(ApiError::BadRequest(format!(
            "Invalid config at '{}.rag.fetch_k': must be at least top_k ({})",
            prefix, rag.top_k
        )));
    }
    if let (Some(size), Some(overlap)) = (rag.chunk_size, rag.chunk_overlap) {
        if overlap >= size {
            return Err(ApiError::BadRequest(format!(
                "Invalid config at '{}.rag.chunk_overlap': must be less than chunk_size ({})",
                prefix, size
            )));
        }
    }

    validate_prompt(
        &format!("{}.prompts.sys", prefix),
        PromptCategory::Sys,
        &settings.prompts.sys,
    )?;
    validate_prompt(
        &format!("{}.prompts.ctx", prefix),
        PromptCategory::Ctx,
        &settings.prompts.ctx,
    )?;

    if settings.oci.auth_profile.trim().is_empty() {
        return Err(empty_error(&format!("{}.oci.auth_profile", prefix)));
    }
    if settings.rag.database_alias.trim().is_empty() {
        return Err(empty_error(&format!("{}.rag.database_alias", prefix)));
    }

    Ok(())
}

fn validate_range<T>(path: &str, value: T, min: T, max: T) -> Result<(), ApiError>
where
    T: PartialOrd + Display,
{
    // NaN compares false both ways and is rejected here as well.
    if value >= min && value <= max {
        return Ok(());
    }
    Err(ApiError::BadRequest(format!(
        "Invalid config at '{}': must be between {} and {}",
        path, min, max
    )))
}

fn validate_prompt(path: &str, category: PromptCategory, name: &str) -> Result<(), ApiError> {
    let known = BUILTIN_PROMPTS
        .iter()
        .any(|prompt| prompt.category == category && prompt.name == name);
    if known {
        return Ok(());
    }
    Err(ApiError::BadRequest(format!(
        "Invalid config at '{}': unknown {} prompt '{}'",
        path, category, name
    )))
}

fn validate_unique_keys<I>(section: &str, field: &str, keys: I) -> Result<(), ApiError>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    for (index, key) in keys.into_iter().enumerate() {
        if key.trim().is_empty() {
            return Err(empty_error(&format!("{}[{}].{}", section, index, field)));
        }
        if !seen.insert(key.clone()) {
            return Err(ApiError::BadRequest(format!(
                "Invalid config at '{}[{}]': duplicate {} '{}'",
                section, index, field, key
            )));
        }
    }
    Ok(())
}

fn empty_error(path: &str) -> ApiError {
    ApiError::BadRequest(format!(
        "Invalid config at '{}': value cannot be empty",
        path
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DatabaseConfig, OciProfileConfig};

    #[test]
    fn default_settings_are_valid() {
        assert!(validate_settings(&Settings::default()).is_ok());
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let mut settings = Settings::default();
        settings.ll_model.top_p = 1.5;
        let err = validate_settings(&settings).unwrap_err();
        assert!(err.to_string().contains("ll_model.top_p"));

        let mut settings = Settings::default();
        settings.ll_model.temperature = f32::NAN;
        assert!(validate_settings(&settings).is_err());

        let mut settings = Settings::default();
        settings.rag.top_k = 0;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn chunk_overlap_must_be_smaller_than_chunk_size() {
        let mut settings = Settings::default();
        settings.rag.chunk_size = Some(500);
        settings.rag.chunk_overlap = Some(500);
        assert!(validate_settings(&settings).is_err());

        settings.rag.chunk_overlap = Some(50);
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn fetch_k_must_cover_top_k() {
        let mut settings = Settings::default();
        settings.rag.top_k = 30;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn prompt_selection_must_exist_in_category() {
        let mut settings = Settings::default();
        settings.prompts.sys = "grade".to_string();
        let err = validate_settings(&settings).unwrap_err();
        assert!(err.to_string().contains("unknown sys prompt 'grade'"));

        settings.prompts.sys = "tools-example".to_string();
        settings.prompts.ctx = "grade".to_string();
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let config = Configuration {
            database_configs: vec![DatabaseConfig::new("CORE"), DatabaseConfig::new("CORE")],
            ..Configuration::default()
        };
        let err = validate_configuration(&config).unwrap_err();
        assert!(err.to_string().contains("duplicate alias 'CORE'"));

        let config = Configuration {
            oci_configs: vec![OciProfileConfig::new(" ")],
            ..Configuration::default()
        };
        assert!(validate_configuration(&config).is_err());
    }
}
