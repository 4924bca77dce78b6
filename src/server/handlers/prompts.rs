use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::core::security::require_api_key;
use crate::prompts::PromptCategory;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PromptUpdateRequest {
    pub text: String,
}

pub async fn list_prompts(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    require_api_key(&headers, &state.api_key)?;
    Ok(Json(state.prompts.list()))
}

pub async fn get_prompt(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((category, name)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    require_api_key(&headers, &state.api_key)?;
    let category: PromptCategory = category.parse()?;
    Ok(Json(state.prompts.get(category, &name)?))
}

pub async fn patch_prompt(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((category, name)): Path<(String, String)>,
    Json(payload): Json<PromptUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_api_key(&headers, &state.api_key)?;
    let category: PromptCategory = category.parse()?;
    Ok(Json(state.prompts.set_text(category, &name, &payload.text)?))
}

pub async fn reset_prompt(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((category, name)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    require_api_key(&headers, &state.api_key)?;
    let category: PromptCategory = category.parse()?;
    Ok(Json(state.prompts.reset(category, &name)?))
}

pub async fn reset_all_prompts(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    require_api_key(&headers, &state.api_key)?;
    state.prompts.reset_all();
    tracing::info!("All prompt overrides cleared");
    Ok(Json(json!({ "status": "reset" })))
}
