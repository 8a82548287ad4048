use py3ready_core::AppError;
use uuid::Uuid;

/// A report identifier taken from the request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportId(pub Uuid);

impl ReportId {
    /// Malformed ids are a client error, distinct from an id that matches nothing.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        Uuid::parse_str(raw.trim())
            .map(ReportId)
            .map_err(|_| AppError::InvalidInput("Invalid report ID".to_string()))
    }
}
