use py3ready_core::models::{AnalysisResult, CodeIssue, Severity};

use super::client::{ModelIssue, ModelVerdict};

/// Map a model-reported severity onto the fixed vocabulary; anything else is `Medium`.
pub fn normalize_severity(raw: Option<&str>) -> Severity {
    match raw {
        Some(value) => value.parse().unwrap_or_else(|_| {
            tracing::debug!(severity = %value, "Unrecognized severity coerced to medium");
            Severity::Medium
        }),
        None => Severity::Medium,
    }
}

fn normalize_issue(issue: ModelIssue) -> CodeIssue {
    CodeIssue {
        severity: normalize_severity(issue.severity.as_deref()),
        issue: issue.issue,
        line_hint: issue.line_hint,
        fix: issue.fix,
    }
}

/// `files_analyzed` comes from the request selection, never from the model.
pub fn normalize(verdict: ModelVerdict, files_analyzed: Vec<String>) -> AnalysisResult {
    AnalysisResult {
        is_valid_python3: verdict.is_valid_python3,
        files_analyzed,
        issues: verdict.issues.into_iter().map(normalize_issue).collect(),
        summary: verdict.summary,
    }
}
