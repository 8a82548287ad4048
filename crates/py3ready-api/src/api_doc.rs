//! OpenAPI documentation, served at `/api/openapi.json` and rendered by RapiDoc at `/docs`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use py3ready_core::models;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "py3ready API",
        version = "0.1.0",
        description = "Upload a Python file or a zip archive of Python sources and get a structured report of Python 2 constructs that break under Python 3."
    ),
    paths(
        handlers::health::root,
        handlers::health::health,
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::me,
        handlers::migration::analyze_upload,
        handlers::migration::get_report,
        handlers::migration::list_reports,
        handlers::migration::delete_report,
    ),
    components(
        schemas(
            models::Severity,
            models::CodeIssue,
            models::MigrationReport,
            models::ReportSummary,
            models::AnalysisResponse,
            models::ReportListResponse,
            models::MessageResponse,
            models::RegisterRequest,
            models::LoginRequest,
            models::TokenResponse,
            models::UserResponse,
            handlers::health::HealthResponse,
            handlers::health::ServiceInfo,
            error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Service information and liveness"),
        (name = "authentication", description = "User registration, login and token inspection"),
        (name = "migration", description = "Python 2 to 3 compatibility analysis and stored reports")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
