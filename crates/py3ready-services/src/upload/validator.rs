use py3ready_core::UploadConfig;

/// How an accepted upload is to be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    /// A single source file
    Source,
    /// A compressed bundle of source files
    Archive,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{reason}")]
    UnsupportedFileType { filename: String, reason: String },

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Empty file")]
    EmptyFile,

    #[error("Upload has no filename")]
    MissingFilename,
}

/// Name and size checks run before any extraction work.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    max_file_size: usize,
    source_extensions: Vec<String>,
    archive_extensions: Vec<String>,
}

impl UploadValidator {
    pub fn new(
        max_file_size: usize,
        source_extensions: Vec<String>,
        archive_extensions: Vec<String>,
    ) -> Self {
        Self {
            max_file_size,
            source_extensions: normalize(source_extensions),
            archive_extensions: normalize(archive_extensions),
        }
    }

    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(
            config.max_file_size_bytes,
            config.source_extensions.clone(),
            config.archive_extensions.clone(),
        )
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Decide from the filename alone whether the upload is a source file or an archive.
    ///
    /// Matching is a case-insensitive suffix check against `.{ext}`.
    pub fn classify(&self, filename: &str) -> Result<UploadKind, ValidationError> {
        let name = filename.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingFilename);
        }

        let lower = name.to_lowercase();
        if has_extension(&lower, &self.source_extensions) {
            return Ok(UploadKind::Source);
        }
        if has_extension(&lower, &self.archive_extensions) {
            return Ok(UploadKind::Archive);
        }

        Err(ValidationError::UnsupportedFileType {
            filename: filename.to_string(),
            reason: format!("Only {} files allowed", self.allowed_description()),
        })
    }

    pub fn validate_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// `".py and .zip"`, `".py, .pyw and .zip"`
    fn allowed_description(&self) -> String {
        let all: Vec<String> = self
            .source_extensions
            .iter()
            .chain(self.archive_extensions.iter())
            .map(|ext| format!(".{}", ext))
            .collect();

        match all.split_last() {
            None => "no".to_string(),
            Some((last, [])) => last.clone(),
            Some((last, rest)) => format!("{} and {}", rest.join(", "), last),
        }
    }
}

fn normalize(extensions: Vec<String>) -> Vec<String> {
    extensions
        .into_iter()
        .map(|e| e.trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

/// `name` must already be lowercase.
pub(crate) fn has_extension(name: &str, extensions: &[String]) -> bool {
    extensions.iter().any(|ext| {
        name.len() > ext.len()
            && name.ends_with(ext.as_str())
            && name.as_bytes()[name.len() - ext.len() - 1] == b'.'
    })
}
