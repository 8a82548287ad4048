//! Prompt assembly
//!
//! Selects at most `max_files` records, truncates each to a character budget
//! and concatenates them under per-file headers. The same selection feeds
//! `files_analyzed`, so the report lists exactly what the model was shown.

use std::borrow::Cow;

use py3ready_core::models::UploadedFile;
use py3ready_core::AnalyzerConfig;
use serde_json::Value;

/// Appended after truncated content. A Python comment, so it never reads as code.
pub const TRUNCATION_MARKER: &str = "\n# ... (file truncated)";

/// Accepted spellings, in priority order.
pub const FILENAME_ALIASES: [&str; 3] = ["filename", "name", "fileName"];
pub const CONTENT_ALIASES: [&str; 3] = ["content", "text", "source"];

/// Anything that can yield a `(filename, content)` pair.
pub trait SourceRecord {
    /// `None` when either field is missing; such records are skipped.
    fn file_fields(&self) -> Option<(&str, &str)>;
}

impl SourceRecord for UploadedFile {
    fn file_fields(&self) -> Option<(&str, &str)> {
        if self.filename.is_empty() {
            return None;
        }
        Some((&self.filename, &self.content))
    }
}

/// Loosely-typed records from clients that name the fields differently.
impl SourceRecord for Value {
    fn file_fields(&self) -> Option<(&str, &str)> {
        let filename = FILENAME_ALIASES
            .iter()
            .filter_map(|key| self.get(*key).and_then(Value::as_str))
            .find(|s| !s.is_empty())?;

        let mut contents = CONTENT_ALIASES
            .iter()
            .filter_map(|key| self.get(*key).and_then(Value::as_str))
            .peekable();
        let first = *contents.peek()?;
        let content = contents.find(|s| !s.is_empty()).unwrap_or(first);

        Some((filename, content))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLimits {
    pub max_files: usize,
    pub max_chars_per_file: usize,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            max_files: 10,
            max_chars_per_file: 5000,
        }
    }
}

impl From<&AnalyzerConfig> for RequestLimits {
    fn from(config: &AnalyzerConfig) -> Self {
        Self {
            max_files: config.max_files,
            max_chars_per_file: config.max_chars_per_file,
        }
    }
}

/// The prompt body plus the filenames it contains, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub prompt: String,
    pub files_analyzed: Vec<String>,
}

impl AnalysisRequest {
    pub fn is_empty(&self) -> bool {
        self.files_analyzed.is_empty()
    }
}

/// The first `max_files` records, minus those without usable fields.
pub fn select_files<R: SourceRecord>(records: &[R], max_files: usize) -> Vec<(&str, &str)> {
    records
        .iter()
        .take(max_files)
        .filter_map(SourceRecord::file_fields)
        .collect()
}

/// Keep the first `max_chars` characters and append [`TRUNCATION_MARKER`] if anything was cut.
pub fn truncate_content(content: &str, max_chars: usize) -> Cow<'_, str> {
    match content.char_indices().nth(max_chars) {
        None => Cow::Borrowed(content),
        Some((cut, _)) => {
            let mut truncated = String::with_capacity(cut + TRUNCATION_MARKER.len());
            truncated.push_str(&content[..cut]);
            truncated.push_str(TRUNCATION_MARKER);
            Cow::Owned(truncated)
        }
    }
}

pub fn build_request<R: SourceRecord>(records: &[R], limits: RequestLimits) -> AnalysisRequest {
    let selected = select_files(records, limits.max_files);

    let prompt = selected
        .iter()
        .map(|(filename, content)| {
            format!(
                "# === File: {} ===\n{}",
                filename,
                truncate_content(content, limits.max_chars_per_file)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    AnalysisRequest {
        prompt,
        files_analyzed: selected
            .into_iter()
            .map(|(filename, _)| filename.to_string())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn files(n: usize) -> Vec<UploadedFile> {
        (0..n)
            .map(|i| UploadedFile::new(format!("f{i:02}.py"), format!("x = {i}")))
            .collect()
    }

    #[test]
    fn formats_headers_and_blank_line_separators() {
        let request = build_request(
            &[
                UploadedFile::new("a.py", "print 'a'"),
                UploadedFile::new("b.py", "print 'b'"),
            ],
            RequestLimits::default(),
        );
        assert_eq!(
            request.prompt,
            "# === File: a.py ===\nprint 'a'\n\n# === File: b.py ===\nprint 'b'"
        );
        assert_eq!(request.files_analyzed, vec!["a.py", "b.py"]);
    }

    #[test]
    fn caps_file_count_in_original_order() {
        let limits = RequestLimits {
            max_files: 10,
            ..RequestLimits::default()
        };
        let request = build_request(&files(13), limits);

        let expected: Vec<String> = (0..10).map(|i| format!("f{i:02}.py")).collect();
        assert_eq!(request.files_analyzed, expected);
        assert!(request.prompt.contains("# === File: f09.py ==="));
        assert!(!request.prompt.contains("f10.py"));
        assert!(!request.prompt.contains("f12.py"));
    }

    #[test]
    fn truncates_to_budget_plus_marker() {
        let content = "a".repeat(5001);
        let truncated = truncate_content(&content, 5000);
        assert_eq!(truncated.len(), 5000 + TRUNCATION_MARKER.len());
        assert!(truncated.ends_with(TRUNCATION_MARKER));
        assert_eq!(&truncated[..5000], "a".repeat(5000));

        let exact = "b".repeat(5000);
        assert!(matches!(truncate_content(&exact, 5000), Cow::Borrowed(_)));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let content = "é".repeat(10);
        let truncated = truncate_content(&content, 4);
        assert_eq!(truncated, format!("éééé{}", TRUNCATION_MARKER));
    }

    #[test]
    fn truncated_file_appears_in_prompt() {
        let request = build_request(
            &[UploadedFile::new("big.py", "y".repeat(20))],
            RequestLimits {
                max_files: 10,
                max_chars_per_file: 8,
            },
        );
        assert_eq!(
            request.prompt,
            format!("# === File: big.py ===\n{}{}", "y".repeat(8), TRUNCATION_MARKER)
        );
    }

    #[test]
    fn json_records_accept_aliases_in_priority_order() {
        let record = json!({"name": "alias.py", "fileName": "ignored.py", "text": "code"});
        assert_eq!(record.file_fields(), Some(("alias.py", "code")));

        let record = json!({"filename": "", "fileName": "third.py", "source": "src"});
        assert_eq!(record.file_fields(), Some(("third.py", "src")));

        let record = json!({"filename": "a.py", "content": "", "text": "fallback"});
        assert_eq!(record.file_fields(), Some(("a.py", "fallback")));

        let record = json!({"filename": "empty.py", "content": ""});
        assert_eq!(record.file_fields(), Some(("empty.py", "")));
    }

    #[test]
    fn json_records_missing_fields_are_skipped() {
        let records = vec![
            json!({"filename": "ok.py", "content": "x = 1"}),
            json!({"filename": "no_content.py"}),
            json!({"content": "no name"}),
            json!({"filename": 42, "content": "wrong type"}),
            json!({"fileName": "camel.py", "source": "y = 2"}),
        ];
        let request = build_request(&records, RequestLimits::default());
        assert_eq!(request.files_analyzed, vec!["ok.py", "camel.py"]);
    }

    #[test]
    fn cap_applies_before_skipping_invalid_records() {
        let records = vec![
            json!({"filename": "a.py", "content": "1"}),
            json!({"bogus": true}),
            json!({"filename": "c.py", "content": "3"}),
        ];
        let selected = select_files(&records, 2);
        assert_eq!(selected, vec![("a.py", "1")]);
    }
}
