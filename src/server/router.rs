use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::core::security::API_KEY_HEADER;
use crate::server::handlers::{databases, health, mcp, models, oci, prompts, settings};
use crate::state::AppState;

/// Creates the application router.
///
/// Liveness, readiness and the MCP health probe are open; every other
/// route checks the `X-API-Key` header. When a URL prefix is configured
/// all routes are nested under it.
pub fn router(state: Arc<AppState>) -> Router {
    let prefix = state.env.url_prefix.clone();

    let routes = Router::new()
        .route("/v1/liveness", get(health::liveness))
        .route("/v1/readiness", get(health::readiness))
        .route("/v1/status", get(health::get_status))
        .route(
            "/v1/settings",
            get(settings::get_settings)
                .post(settings::create_settings)
                .patch(settings::patch_settings),
        )
        .route("/v1/settings/load/json", post(settings::load_settings_json))
        .route("/v1/settings/compare", post(settings::compare_settings_json))
        .route("/v1/settings/save", post(settings::save_settings))
        .route("/v1/prompts", get(prompts::list_prompts))
        .route("/v1/prompts/reset", post(prompts::reset_all_prompts))
        .route(
            "/v1/prompts/:category/:name",
            get(prompts::get_prompt)
                .patch(prompts::patch_prompt)
                .delete(prompts::reset_prompt),
        )
        .route("/v1/databases", get(databases::list_databases))
        .route(
            "/v1/databases/:alias",
            get(databases::get_database).patch(databases::patch_database),
        )
        .route("/v1/oci", get(oci::list_oci_profiles))
        .route(
            "/v1/oci/:auth_profile",
            get(oci::get_oci_profile).patch(oci::patch_oci_profile),
        )
        .route("/v1/models", get(models::list_models))
        .route(
            "/v1/models/:provider/:id",
            get(models::get_model).patch(models::patch_model),
        )
        .route("/v1/mcp/status", get(mcp::mcp_status))
        .route("/v1/mcp/tools", get(mcp::mcp_tools))
        .route("/v1/mcp/resources", get(mcp::mcp_resources))
        .route("/v1/mcp/prompts", get(mcp::mcp_prompts))
        .route("/mcp/healthz", get(mcp::mcp_healthz))
        .with_state(state);

    let app = if prefix.is_empty() {
        routes
    } else {
        Router::new().nest(&prefix, routes)
    };

    app.layer(build_cors_layer()).layer(TraceLayer::new_for_http())
}

fn build_cors_layer() -> CorsLayer {
    let allowed_origins = default_local_origins()
        .into_iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::HeaderName::from_static(API_KEY_HEADER),
        ])
}

fn default_local_origins() -> Vec<&'static str> {
    vec![
        "http://localhost",
        "http://localhost:8501",
        "http://127.0.0.1",
        "http://127.0.0.1:8501",
    ]
}
