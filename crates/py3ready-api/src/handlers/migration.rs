//! Migration analysis endpoints. All of them act on the caller's own reports.

use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::services::MigrationService;
use crate::state::AppState;
use crate::utils::report_id::ReportId;
use crate::utils::upload::extract_multipart_file;
use axum::{
    extract::{Multipart, Path, Query, State},
    response::IntoResponse,
    Json,
};
use py3ready_core::models::{
    AnalysisResponse, ListReportsQuery, MessageResponse, MigrationReport, ReportListResponse,
};
use std::sync::Arc;

/// Listing size when the caller does not ask for one
pub const DEFAULT_LIST_LIMIT: i64 = 10;

#[utoipa::path(
    post,
    path = "/api/migration/analyze",
    tag = "migration",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Upload analyzed and report stored", body = AnalysisResponse),
        (status = 400, description = "Unsupported file type or malformed upload", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 422, description = "Corrupt archive or no Python files", body = ErrorResponse),
        (status = 502, description = "Model service failed", body = ErrorResponse),
        (status = 503, description = "Analyzer not configured", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn analyze_upload(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let (filename, data) = extract_multipart_file(multipart).await?;

    let response = MigrationService::new(&state)
        .analyze_upload(auth_user.id(), &filename, data)
        .await?;

    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/migration/report/{id}",
    tag = "migration",
    params(("id" = String, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Full migration report", body = MigrationReport),
        (status = 400, description = "Invalid report ID", body = ErrorResponse),
        (status = 404, description = "Report not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_report(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let ReportId(id) = ReportId::parse(&id)?;
    let report = MigrationService::new(&state)
        .get_report(auth_user.id(), id)
        .await?;
    Ok(Json(report))
}

#[utoipa::path(
    get,
    path = "/api/migration/reports",
    tag = "migration",
    params(ListReportsQuery),
    responses(
        (status = 200, description = "Most recent reports first", body = ReportListResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_reports(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
    Query(query): Query<ListReportsQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    let reports = state.reports.list(auth_user.id(), limit).await?;
    Ok(Json(ReportListResponse { reports }))
}

#[utoipa::path(
    delete,
    path = "/api/migration/report/{id}",
    tag = "migration",
    params(("id" = String, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Report deleted", body = MessageResponse),
        (status = 400, description = "Invalid report ID", body = ErrorResponse),
        (status = 404, description = "Report not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_report(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let ReportId(id) = ReportId::parse(&id)?;
    MigrationService::new(&state)
        .delete_report(auth_user.id(), id)
        .await?;
    Ok(Json(MessageResponse {
        message: "Deleted".to_string(),
    }))
}
