use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};

use crate::core::config::{compare_settings, Redact};
use crate::core::errors::ApiError;
use crate::core::security::require_api_key;
use crate::schema::Configuration;
use crate::server::handlers::utils::ClientQuery;
use crate::state::AppState;

pub async fn get_settings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<ClientQuery>,
) -> Result<impl IntoResponse, ApiError> {
    require_api_key(&headers, &state.api_key)?;
    state.restore_client(&params.client).await;
    let configuration = state
        .config
        .configuration(&params.client, params.include_secrets)?;
    Ok(Json(configuration))
}

pub async fn create_settings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<ClientQuery>,
) -> Result<impl IntoResponse, ApiError> {
    require_api_key(&headers, &state.api_key)?;
    state.restore_client(&params.client).await;
    let settings = state.config.create_client(&params.client)?;
    state.persist_settings(&params.client).await;
    Ok((StatusCode::CREATED, Json(settings)))
}

pub async fn patch_settings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<ClientQuery>,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    require_api_key(&headers, &state.api_key)?;
    state.restore_client(&params.client).await;
    let settings = state
        .config
        .update_client_settings(&params.client, &payload)?;
    state.persist_settings(&params.client).await;
    Ok(Json(settings))
}

pub async fn load_settings_json(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<ClientQuery>,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    require_api_key(&headers, &state.api_key)?;
    state.restore_client(&params.client).await;
    let document = parse_document(payload)?;
    let settings = state.config.apply_configuration(&params.client, document)?;
    state.persist_settings(&params.client).await;
    Ok(Json(settings))
}

/// Differences between an uploaded document and the server's, secrets
/// excluded on both sides.
pub async fn compare_settings_json(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<ClientQuery>,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    require_api_key(&headers, &state.api_key)?;
    state.restore_client(&params.client).await;
    let uploaded = parse_document(payload)?.redacted();
    let server = state.config.configuration(&params.client, false)?;

    let uploaded_value = serde_json::to_value(uploaded).map_err(ApiError::internal)?;
    let server_value = serde_json::to_value(server).map_err(ApiError::internal)?;
    let differences = compare_settings(&uploaded_value, &server_value);

    Ok(Json(json!({
        "client": params.client,
        "differences": differences
    })))
}

pub async fn save_settings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<ClientQuery>,
) -> Result<impl IntoResponse, ApiError> {
    require_api_key(&headers, &state.api_key)?;
    state.restore_client(&params.client).await;
    let path = state.config.save_to_file(&params.client)?;
    Ok(Json(json!({
        "status": "saved",
        "path": path.to_string_lossy()
    })))
}

fn parse_document(payload: Value) -> Result<Configuration, ApiError> {
    serde_json::from_value(payload)
        .map_err(|err| ApiError::BadRequest(format!("Invalid configuration document: {}", err)))
}
