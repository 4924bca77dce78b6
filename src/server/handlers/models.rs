use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::core::errors::ApiError;
use crate::core::security::require_api_key;
use crate::schema::ModelType;
use crate::server::handlers::utils::SecretsQuery;
use crate::state::AppState;

#[derive(Debug, Deserialize, Default)]
pub struct ModelsQuery {
    pub model_type: Option<ModelType>,
    #[serde(default)]
    pub include_secrets: bool,
}

pub async fn list_models(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<ModelsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    require_api_key(&headers, &state.api_key)?;
    Ok(Json(
        state
            .config
            .models(params.model_type, params.include_secrets)?,
    ))
}

pub async fn get_model(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((provider, id)): Path<(String, String)>,
    Query(params): Query<SecretsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    require_api_key(&headers, &state.api_key)?;
    Ok(Json(
        state
            .config
            .model(&provider, &id, params.include_secrets)?,
    ))
}

pub async fn patch_model(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((provider, id)): Path<(String, String)>,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    require_api_key(&headers, &state.api_key)?;
    Ok(Json(state.config.update_model(&provider, &id, &payload)?))
}
