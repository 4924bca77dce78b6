use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::core::security::require_api_key;
use crate::state::AppState;

pub async fn mcp_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    require_api_key(&headers, &state.api_key)?;
    Ok(Json(state.mcp.status(&state.prompts)))
}

pub async fn mcp_tools(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    require_api_key(&headers, &state.api_key)?;
    Ok(Json(json!({ "tools": state.mcp.tools() })))
}

pub async fn mcp_resources(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    require_api_key(&headers, &state.api_key)?;
    Ok(Json(json!({ "resources": state.mcp.resources() })))
}

pub async fn mcp_prompts(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    require_api_key(&headers, &state.api_key)?;
    Ok(Json(json!({ "prompts": state.mcp.prompts(&state.prompts) })))
}

/// Unauthenticated probe used by MCP clients before connecting.
pub async fn mcp_healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ready",
        "name": state.mcp.name(),
        "version": state.mcp.version(),
        "tools": state.mcp.tools().len()
    }))
}
