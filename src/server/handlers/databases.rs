use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value;

use crate::core::errors::ApiError;
use crate::core::security::require_api_key;
use crate::server::handlers::utils::SecretsQuery;
use crate::state::AppState;

pub async fn list_databases(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<SecretsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    require_api_key(&headers, &state.api_key)?;
    Ok(Json(state.config.databases(params.include_secrets)?))
}

pub async fn get_database(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(alias): Path<String>,
    Query(params): Query<SecretsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    require_api_key(&headers, &state.api_key)?;
    Ok(Json(state.config.database(&alias, params.include_secrets)?))
}

pub async fn patch_database(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(alias): Path<String>,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    require_api_key(&headers, &state.api_key)?;
    Ok(Json(state.config.update_database(&alias, &payload)?))
}
