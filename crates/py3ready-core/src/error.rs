//! Error types module
//!
//! All failures that can reach an API caller are unified under [`AppError`].
//! Each variant self-describes its HTTP presentation through [`ErrorMetadata`],
//! so the API layer only renders what the error reports about itself.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Expected errors like validation failures
    Debug,
    /// Recoverable issues like an upstream service hiccup
    Warn,
    /// Unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "NO_SOURCE_FILES")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Invalid archive: {0}")]
    InvalidArchive(String),

    #[error("No source files found: {0}")]
    NoSourceFiles(String),

    #[error("Analyzer not configured: {0}")]
    AnalyzerNotConfigured(String),

    #[error("Analysis failed: {message}")]
    AnalysisFailed {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(format!("Validation error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Database(_) => (
            500,
            "DATABASE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::UnsupportedFileType(_) => (
            400,
            "UNSUPPORTED_FILE_TYPE",
            false,
            Some("Upload a .py file or a .zip archive"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size or split the project into smaller archives"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidArchive(_) => (
            422,
            "INVALID_ARCHIVE",
            false,
            Some("Re-create the zip archive and upload it again"),
            false,
            LogLevel::Debug,
        ),
        AppError::NoSourceFiles(_) => (
            422,
            "NO_SOURCE_FILES",
            false,
            Some("Make sure the archive contains .py files outside cache directories"),
            false,
            LogLevel::Debug,
        ),
        AppError::AnalyzerNotConfigured(_) => (
            503,
            "ANALYZER_NOT_CONFIGURED",
            false,
            Some("Contact the service operator"),
            false,
            LogLevel::Error,
        ),
        AppError::AnalysisFailed { .. } => (
            502,
            "ANALYSIS_FAILED",
            true,
            Some("Retry after a short delay"),
            false,
            LogLevel::Warn,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the resource ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::Unauthorized(_) => (
            401,
            "UNAUTHORIZED",
            false,
            Some("Check the authentication token"),
            false,
            LogLevel::Debug,
        ),
        AppError::Forbidden(_) => (
            403,
            "FORBIDDEN",
            false,
            None,
            false,
            LogLevel::Debug,
        ),
        AppError::Conflict(_) => (
            409,
            "CONFLICT",
            false,
            Some("Use a different value and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::UnsupportedFileType(_) => "UnsupportedFileType",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::InvalidArchive(_) => "InvalidArchive",
            AppError::NoSourceFiles(_) => "NoSourceFiles",
            AppError::AnalyzerNotConfigured(_) => "AnalyzerNotConfigured",
            AppError::AnalysisFailed { .. } => "AnalysisFailed",
            AppError::NotFound(_) => "NotFound",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::Forbidden(_) => "Forbidden",
            AppError::Conflict(_) => "Conflict",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::InvalidInput(ref msg)
            | AppError::UnsupportedFileType(ref msg)
            | AppError::PayloadTooLarge(ref msg)
            | AppError::InvalidArchive(ref msg)
            | AppError::NoSourceFiles(ref msg)
            | AppError::AnalyzerNotConfigured(ref msg)
            | AppError::NotFound(ref msg)
            | AppError::Unauthorized(ref msg)
            | AppError::Forbidden(ref msg)
            | AppError::Conflict(ref msg) => msg.clone(),
            AppError::AnalysisFailed { ref message, .. } => message.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_database() {
        #[cfg(feature = "sqlx")]
        let err = AppError::from(sqlx::Error::PoolClosed);
        #[cfg(not(feature = "sqlx"))]
        let err = AppError::Database("pool closed".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "DATABASE_ERROR");
        assert!(err.is_recoverable());
        assert_eq!(err.client_message(), "Failed to access database");
        assert!(err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_validation_and_extraction_are_distinct() {
        let validation = AppError::UnsupportedFileType("Only .py and .zip files allowed".into());
        let extraction = AppError::NoSourceFiles("No Python files found".into());
        assert_eq!(validation.http_status_code(), 400);
        assert_eq!(extraction.http_status_code(), 422);
        assert_ne!(validation.error_code(), extraction.error_code());
        assert_eq!(
            extraction.client_message(),
            "No Python files found".to_string()
        );
    }

    #[test]
    fn test_configuration_and_service_errors_are_distinct() {
        let config = AppError::AnalyzerNotConfigured("missing key".into());
        let service = AppError::AnalysisFailed {
            message: "Model service request failed".into(),
            source: anyhow::anyhow!("connection refused"),
        };
        assert_eq!(config.http_status_code(), 503);
        assert!(!config.is_recoverable());
        assert_eq!(service.http_status_code(), 502);
        assert!(service.is_recoverable());
        assert_eq!(service.log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_detailed_message_includes_cause() {
        let err = AppError::AnalysisFailed {
            message: "Model service request failed".into(),
            source: anyhow::anyhow!("connection refused"),
        };
        let details = err.detailed_message();
        assert!(details.starts_with("Analysis failed: Model service request failed"));
        assert!(details.contains("Caused by: connection refused"));
    }

    #[test]
    fn test_internal_is_sensitive() {
        let err = AppError::Internal("secret path /var/lib".into());
        assert!(err.is_sensitive());
        assert_eq!(err.client_message(), "Internal server error");
        assert_eq!(err.error_type(), "Internal");
    }

    #[test]
    fn test_request_errors_report_invalid_input() {
        let mut errors = validator::ValidationErrors::new();
        errors.add("email", validator::ValidationError::new("email"));
        let err = AppError::from(errors);
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert_eq!(err.error_type(), "InvalidInput");
        assert!(err.client_message().starts_with("Validation error:"));
    }

    #[test]
    fn test_error_metadata_suggested_actions() {
        let err = AppError::NotFound("Report not found".to_string());
        assert_eq!(err.suggested_action(), Some("Verify the resource ID exists"));

        let err = AppError::InvalidInput("test".to_string());
        assert_eq!(
            err.suggested_action(),
            Some("Check request parameters and try again")
        );
        assert_eq!(AppError::Forbidden("x".into()).suggested_action(), None);
    }
}
