//! Route configuration and setup

use crate::constants::{API_BASE, AUTH_PREFIX, MIGRATION_PREFIX, MULTIPART_OVERHEAD_BYTES};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use py3ready_core::Config;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Build the full application router.
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let body_limit = config
        .upload
        .max_file_size_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let protected_routes = protected_routes().layer(axum::middleware::from_fn_with_state(
        Arc::new(state.auth.clone()),
        crate::auth::middleware::auth_middleware,
    ));

    let app = public_routes()
        .merge(protected_routes)
        .merge(
            utoipa_rapidoc::RapiDoc::new(format!("{}/openapi.json", API_BASE)).path("/docs"),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!(body_limit, "Routes configured");
    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];

    if config.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any));
    }

    let origins = config
        .cors_origins
        .iter()
        .map(|o| o.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(Any))
}

/// Routes that need no authentication
fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health))
        .route(
            &format!("{}/openapi.json", API_BASE),
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
        .route(
            &format!("{}/register", AUTH_PREFIX),
            post(handlers::auth::register),
        )
        .route(&format!("{}/login", AUTH_PREFIX), post(handlers::auth::login))
}

/// Routes behind the bearer-token middleware
fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(&format!("{}/me", AUTH_PREFIX), get(handlers::auth::me))
        .route(
            &format!("{}/analyze", MIGRATION_PREFIX),
            post(handlers::migration::analyze_upload),
        )
        .route(
            &format!("{}/report/{{id}}", MIGRATION_PREFIX),
            get(handlers::migration::get_report).delete(handlers::migration::delete_report),
        )
        .route(
            &format!("{}/reports", MIGRATION_PREFIX),
            get(handlers::migration::list_reports),
        )
}
