use crate::constants::{AUTH_PREFIX, MIGRATION_PREFIX, SERVICE_NAME};
use crate::state::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceInfo {
    pub message: String,
    pub version: String,
    pub analyzer_enabled: bool,
    pub docs: String,
    pub endpoints: Vec<String>,
}

#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses((status = 200, description = "Service information", body = ServiceInfo))
)]
pub async fn root(State(state): State<Arc<AppState>>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        analyzer_enabled: state.analysis.is_enabled(),
        docs: "/docs".to_string(),
        endpoints: vec![
            format!("POST {AUTH_PREFIX}/register"),
            format!("POST {AUTH_PREFIX}/login"),
            format!("GET {AUTH_PREFIX}/me"),
            format!("POST {MIGRATION_PREFIX}/analyze"),
            format!("GET {MIGRATION_PREFIX}/report/{{id}}"),
            format!("GET {MIGRATION_PREFIX}/reports"),
            format!("DELETE {MIGRATION_PREFIX}/report/{{id}}"),
        ],
    })
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Process is up", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}
