#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use aio_server::core::config::ServerEnv;
use aio_server::server::router::router;
use aio_server::state::AppState;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use serde_json::Value;

pub const API_KEY: &str = "test-api-key";

pub fn test_env(dir: &Path) -> ServerEnv {
    ServerEnv {
        api_key: Some(API_KEY.to_string()),
        url_prefix: String::new(),
        log_level: None,
        log_dir: None,
        port: 0,
        config_file: dir.join("configuration.json"),
        database: None,
        warnings: Vec::new(),
    }
}

pub async fn state_for(env: ServerEnv) -> Arc<AppState> {
    AppState::initialize(env)
        .await
        .expect("state should initialize")
}

pub async fn app_for(env: ServerEnv) -> Router {
    router(state_for(env).await)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-api-key", API_KEY)
        .body(Body::empty())
        .unwrap()
}

pub fn send_json(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-api-key", API_KEY)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
