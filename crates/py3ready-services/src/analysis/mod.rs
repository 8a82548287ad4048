//! Compatibility analysis
//!
//! [`AnalysisService`] runs one request end to end: build the prompt, call the
//! model client once (plus bounded retries inside the client) and normalize the
//! verdict. It holds no per-request state and is shared through `Arc`.

mod client;
mod gemini;
mod normalizer;
mod request;

use std::sync::Arc;

use py3ready_core::models::AnalysisResult;
use py3ready_core::AnalyzerConfig;

pub use client::{
    user_message, verdict_schema, AnalyzerError, ModelClient, ModelIssue, ModelVerdict,
    SYSTEM_INSTRUCTION,
};
pub use gemini::GeminiClient;
pub use normalizer::{normalize, normalize_severity};
pub use request::{
    build_request, select_files, truncate_content, AnalysisRequest, RequestLimits, SourceRecord,
    CONTENT_ALIASES, FILENAME_ALIASES, TRUNCATION_MARKER,
};

#[derive(Clone)]
pub struct AnalysisService {
    client: Option<Arc<dyn ModelClient>>,
    limits: RequestLimits,
}

impl AnalysisService {
    /// `client == None` builds a disabled service; every `analyze` call then fails
    /// with `AnalyzerError::NotConfigured`.
    pub fn new(client: Option<Arc<dyn ModelClient>>, limits: RequestLimits) -> Self {
        if client.is_none() {
            tracing::warn!("No GEMINI_API_KEY found - LLM analyzer disabled");
        }
        Self { client, limits }
    }

    pub fn from_config(config: &AnalyzerConfig) -> anyhow::Result<Self> {
        let client = GeminiClient::from_config(config)?;
        if client.is_some() {
            tracing::info!(model = %config.model, "LLM analyzer initialized with Gemini API");
        }
        Ok(Self::new(
            client.map(|c| Arc::new(c) as Arc<dyn ModelClient>),
            RequestLimits::from(config),
        ))
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    pub fn limits(&self) -> RequestLimits {
        self.limits
    }

    pub async fn analyze<R>(&self, records: &[R]) -> Result<AnalysisResult, AnalyzerError>
    where
        R: SourceRecord + Sync,
    {
        let client = self.client.as_ref().ok_or(AnalyzerError::NotConfigured)?;

        let request = build_request(records, self.limits);
        if request.is_empty() {
            return Err(AnalyzerError::NoFiles);
        }

        tracing::info!(
            files = request.files_analyzed.len(),
            prompt_chars = request.prompt.len(),
            "Sending code to model service for analysis"
        );

        let verdict = client.generate(&request.prompt).await?;
        let result = normalize(verdict, request.files_analyzed);

        tracing::info!(
            is_valid_python3 = result.is_valid_python3,
            issues = result.issues.len(),
            "Analysis complete"
        );

        Ok(result)
    }
}
