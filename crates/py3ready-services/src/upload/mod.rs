//! Upload intake: classify the upload by name, then turn its bytes into source files.

mod extractor;
mod validator;

pub use extractor::{ArchiveExtractor, ExtractionError};
pub use validator::{UploadKind, UploadValidator, ValidationError};

use py3ready_core::AppError;

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::UnsupportedFileType { .. } => {
                AppError::UnsupportedFileType(err.to_string())
            }
            ValidationError::FileTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            ValidationError::EmptyFile | ValidationError::MissingFilename => {
                AppError::InvalidInput(err.to_string())
            }
        }
    }
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::InvalidArchive(_) => AppError::InvalidArchive(err.to_string()),
            ExtractionError::NoSourceFiles => AppError::NoSourceFiles(err.to_string()),
        }
    }
}
