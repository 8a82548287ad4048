//! Model client contract
//!
//! The reply must deserialize into [`ModelVerdict`] exactly. Nothing here tries
//! to repair a malformed reply; it is an error.

use py3ready_core::AppError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Structured verdict as returned by the model service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelVerdict {
    pub is_valid_python3: bool,
    pub issues: Vec<ModelIssue>,
    pub summary: String,
}

/// One issue as the model reported it. Severity is still free text here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelIssue {
    pub issue: String,
    #[serde(default)]
    pub severity: Option<String>,
    pub line_hint: String,
    pub fix: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    #[error("LLM analyzer is not configured. Please set GEMINI_API_KEY.")]
    NotConfigured,

    #[error("Model service request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Model service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Model reply does not match the analysis schema: {0}")]
    InvalidResponse(#[source] serde_json::Error),

    #[error("Model service returned no content")]
    EmptyResponse,

    #[error("No Python files found")]
    NoFiles,
}

impl AnalyzerError {
    /// Failures worth another attempt. Schema failures never are.
    pub fn is_transient(&self) -> bool {
        match self {
            AnalyzerError::Request(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            AnalyzerError::Status { status, .. } => *status == 429 || *status >= 500,
            AnalyzerError::NotConfigured
            | AnalyzerError::InvalidResponse(_)
            | AnalyzerError::EmptyResponse
            | AnalyzerError::NoFiles => false,
        }
    }
}

impl From<AnalyzerError> for AppError {
    fn from(err: AnalyzerError) -> Self {
        let message = match &err {
            AnalyzerError::NotConfigured => {
                return AppError::AnalyzerNotConfigured(err.to_string());
            }
            AnalyzerError::NoFiles => return AppError::NoSourceFiles(err.to_string()),
            AnalyzerError::Request(_) | AnalyzerError::Status { .. } => {
                "Model service request failed"
            }
            AnalyzerError::InvalidResponse(_) | AnalyzerError::EmptyResponse => {
                "Model service returned an invalid analysis"
            }
        };
        AppError::AnalysisFailed {
            message: message.to_string(),
            source: anyhow::Error::new(err),
        }
    }
}

/// A handle that turns a prompt body into a verdict.
///
/// Implementations hold only static configuration and are shared across requests.
#[async_trait::async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<ModelVerdict, AnalyzerError>;
}

pub const SYSTEM_INSTRUCTION: &str = "You are an expert Python developer with deep knowledge of \
Python 2 and Python 3 differences.\n\n\
Analyze the provided Python code and identify any Python 2 syntax, functions or patterns that \
are incompatible with Python 3.\n\n\
Return ONLY a JSON object (no markdown, no code fences), following the provided schema.";

/// Output schema declared to the model service.
pub fn verdict_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "is_valid_python3": {
                "type": "BOOLEAN",
                "description": "True if code is valid Python 3"
            },
            "issues": {
                "type": "ARRAY",
                "description": "List of issues found",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "issue": { "type": "STRING", "description": "Description of the issue found" },
                        "severity": {
                            "type": "STRING",
                            "enum": ["high", "medium", "low"],
                            "description": "high, medium, or low"
                        },
                        "line_hint": { "type": "STRING", "description": "Code snippet or line reference" },
                        "fix": { "type": "STRING", "description": "How to fix this issue" }
                    },
                    "required": ["issue", "severity", "line_hint", "fix"],
                    "propertyOrdering": ["issue", "severity", "line_hint", "fix"]
                }
            },
            "summary": {
                "type": "STRING",
                "description": "Brief summary of code quality"
            }
        },
        "required": ["is_valid_python3", "issues", "summary"],
        "propertyOrdering": ["is_valid_python3", "issues", "summary"]
    })
}

/// User turn: format instructions followed by the code.
pub fn user_message(prompt: &str) -> String {
    format!(
        "The output must be a JSON object that conforms to this schema:\n{}\n\nHere is the code:\n\n{}\n",
        verdict_schema(),
        prompt
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use py3ready_core::ErrorMetadata;

    #[test]
    fn verdict_parses_with_missing_severity() {
        let verdict: ModelVerdict = serde_json::from_str(
            r#"{"is_valid_python3": false, "summary": "s",
                "issues": [{"issue": "i", "line_hint": "l", "fix": "f"}]}"#,
        )
        .unwrap();
        assert_eq!(verdict.issues[0].severity, None);
    }

    #[test]
    fn verdict_rejects_missing_or_mistyped_fields() {
        assert!(serde_json::from_str::<ModelVerdict>(r#"{"issues": [], "summary": "s"}"#).is_err());
        assert!(serde_json::from_str::<ModelVerdict>(
            r#"{"is_valid_python3": "yes", "issues": [], "summary": "s"}"#
        )
        .is_err());
        assert!(serde_json::from_str::<ModelVerdict>(
            "```json\n{\"is_valid_python3\": true, \"issues\": [], \"summary\": \"s\"}\n```"
        )
        .is_err());
    }

    #[test]
    fn transient_classification() {
        assert!(AnalyzerError::Status { status: 503, body: String::new() }.is_transient());
        assert!(AnalyzerError::Status { status: 429, body: String::new() }.is_transient());
        assert!(!AnalyzerError::Status { status: 400, body: String::new() }.is_transient());
        assert!(!AnalyzerError::NotConfigured.is_transient());
        assert!(!AnalyzerError::EmptyResponse.is_transient());

        let schema_err = serde_json::from_str::<ModelVerdict>("{}").unwrap_err();
        assert!(!AnalyzerError::InvalidResponse(schema_err).is_transient());
    }

    #[test]
    fn configuration_and_service_errors_stay_distinct() {
        let config: AppError = AnalyzerError::NotConfigured.into();
        assert!(matches!(config, AppError::AnalyzerNotConfigured(_)));
        assert_eq!(config.error_code(), "ANALYZER_NOT_CONFIGURED");

        let service: AppError = AnalyzerError::Status {
            status: 500,
            body: "boom".into(),
        }
        .into();
        assert!(matches!(service, AppError::AnalysisFailed { .. }));
        assert!(service.detailed_message().contains("Model service returned 500: boom"));
    }

    #[test]
    fn user_message_embeds_schema_and_code() {
        let message = user_message("# === File: a.py ===\nprint 'x'");
        assert!(message.contains("\"is_valid_python3\""));
        assert!(message.ends_with("# === File: a.py ===\nprint 'x'\n"));
    }
}
