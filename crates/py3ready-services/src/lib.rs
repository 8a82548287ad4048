//! py3ready services
//!
//! The upload intake path (validation and extraction) and the analysis path
//! (request building, model client, normalization).

pub mod analysis;
pub mod upload;

pub use analysis::{
    build_request, AnalysisRequest, AnalysisService, AnalyzerError, GeminiClient, ModelClient,
    ModelIssue, ModelVerdict, RequestLimits, SourceRecord,
};
pub use upload::{ArchiveExtractor, ExtractionError, UploadKind, UploadValidator, ValidationError};
