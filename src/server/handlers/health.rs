use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::core::security::require_api_key;
use crate::state::AppState;

pub async fn liveness() -> impl IntoResponse {
    Json(json!({ "status": "alive" }))
}

pub async fn readiness(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ready",
        "persistence": state.persistence.is_some()
    }))
}

pub async fn get_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    require_api_key(&headers, &state.api_key)?;
    let uptime = Utc::now()
        .signed_duration_since(state.started_at)
        .num_seconds();
    Ok(Json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "status": "ok",
        "uptime_seconds": uptime,
        "persistence": state.persistence.is_some()
    })))
}
