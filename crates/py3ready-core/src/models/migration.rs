use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// One decoded source file taken from an upload. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub filename: String,
    pub content: String,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSeverity(pub String);

impl fmt::Display for UnknownSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown severity '{}'", self.0)
    }
}

impl std::error::Error for UnknownSeverity {}

/// Case-insensitive, surrounding whitespace ignored.
impl FromStr for Severity {
    type Err = UnknownSeverity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Severity::High),
            "medium" => Ok(Severity::Medium),
            "low" => Ok(Severity::Low),
            _ => Err(UnknownSeverity(s.to_string())),
        }
    }
}

/// A single compatibility finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CodeIssue {
    /// Description of the issue
    pub issue: String,
    pub severity: Severity,
    /// Where in the code the issue was spotted
    pub line_hint: String,
    /// How to fix it for Python 3
    pub fix: String,
}

/// Outcome of one analysis, before it is stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub is_valid_python3: bool,
    pub files_analyzed: Vec<String>,
    pub issues: Vec<CodeIssue>,
    pub summary: String,
}

/// Persisted analysis report. Created once, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MigrationReport {
    pub id: Uuid,
    #[serde(skip_serializing, default)]
    pub owner_id: Uuid,
    pub is_valid_python3: bool,
    pub files_analyzed: Vec<String>,
    pub issues: Vec<CodeIssue>,
    pub summary: String,
    pub created_at: DateTime<Utc>,
}

impl MigrationReport {
    pub fn issues_count(&self) -> usize {
        self.issues.len()
    }
}

/// Listing projection of a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReportSummary {
    pub id: Uuid,
    pub files_analyzed: Vec<String>,
    pub is_valid_python3: bool,
    pub issues_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&MigrationReport> for ReportSummary {
    fn from(report: &MigrationReport) -> Self {
        ReportSummary {
            id: report.id,
            files_analyzed: report.files_analyzed.clone(),
            is_valid_python3: report.is_valid_python3,
            issues_count: report.issues.len() as i64,
            created_at: report.created_at,
        }
    }
}

/// Response for a completed upload analysis
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnalysisResponse {
    pub report_id: Uuid,
    pub message: String,
}

impl AnalysisResponse {
    pub fn for_report(report: &MigrationReport) -> Self {
        let message = if report.is_valid_python3 {
            "Valid Python 3".to_string()
        } else {
            format!("Found {} issues", report.issues_count())
        };
        Self {
            report_id: report.id,
            message,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportListResponse {
    pub reports: Vec<ReportSummary>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListReportsQuery {
    /// Maximum number of reports to return (default 10, max 100)
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}
