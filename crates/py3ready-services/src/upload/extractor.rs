//! Archive extraction
//!
//! Turns an accepted upload into an ordered list of decoded source files.
//! Bytes that are not valid UTF-8 are replaced rather than rejected, and
//! archive members that cannot be read are skipped with a warning.
//!
//! Decompression is bounded twice: each member is cut at `max_entry_bytes`, and
//! reading stops once `max_total_bytes` have been inflated across the archive.

use std::io::{Cursor, Read};

use py3ready_core::models::UploadedFile;
use py3ready_core::config::{DEFAULT_ARCHIVE_MAX_ENTRY_BYTES, DEFAULT_ARCHIVE_MAX_TOTAL_BYTES};
use py3ready_core::UploadConfig;
use zip::ZipArchive;

use super::validator::{has_extension, UploadKind};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Invalid zip archive: {0}")]
    InvalidArchive(String),

    #[error("No Python files found")]
    NoSourceFiles,
}

#[derive(Debug, Clone)]
pub struct ArchiveExtractor {
    source_extensions: Vec<String>,
    ignored_directories: Vec<String>,
    max_entry_bytes: u64,
    max_total_bytes: u64,
}

impl ArchiveExtractor {
    pub fn new(source_extensions: Vec<String>, ignored_directories: Vec<String>) -> Self {
        Self {
            source_extensions: source_extensions
                .into_iter()
                .map(|e| e.trim().trim_start_matches('.').to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
            ignored_directories,
            max_entry_bytes: DEFAULT_ARCHIVE_MAX_ENTRY_BYTES,
            max_total_bytes: DEFAULT_ARCHIVE_MAX_TOTAL_BYTES,
        }
    }

    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(
            config.source_extensions.clone(),
            config.ignored_directories.clone(),
        )
        .with_limits(config.archive_max_entry_bytes, config.archive_max_total_bytes)
    }

    /// Caps on inflated bytes: per archive member, and for the whole archive.
    pub fn with_limits(mut self, max_entry_bytes: u64, max_total_bytes: u64) -> Self {
        self.max_entry_bytes = max_entry_bytes;
        self.max_total_bytes = max_total_bytes;
        self
    }

    /// Extract source files from an upload already classified by the validator.
    ///
    /// Never returns an empty list: zero eligible files is `NoSourceFiles`.
    pub fn extract(
        &self,
        kind: UploadKind,
        filename: &str,
        data: &[u8],
    ) -> Result<Vec<UploadedFile>, ExtractionError> {
        let files = match kind {
            UploadKind::Source => vec![UploadedFile::new(filename, decode_lossy(data))],
            UploadKind::Archive => self.extract_archive(data)?,
        };

        if files.is_empty() {
            return Err(ExtractionError::NoSourceFiles);
        }

        tracing::debug!(
            upload = %filename,
            files = files.len(),
            "Extracted source files from upload"
        );

        Ok(files)
    }

    fn extract_archive(&self, data: &[u8]) -> Result<Vec<UploadedFile>, ExtractionError> {
        let mut archive = ZipArchive::new(Cursor::new(data))
            .map_err(|e| ExtractionError::InvalidArchive(e.to_string()))?;

        let mut files = Vec::new();
        let mut inflated: u64 = 0;
        for index in 0..archive.len() {
            let mut entry = match archive.by_index(index) {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(index, error = %e, "Skipping unreadable archive entry");
                    continue;
                }
            };

            if entry.is_dir() {
                continue;
            }

            let name = entry.name().to_string();
            if !self.is_eligible(&name) {
                continue;
            }

            let remaining = self.max_total_bytes.saturating_sub(inflated);
            if remaining == 0 {
                tracing::warn!(
                    max_total_bytes = self.max_total_bytes,
                    kept = files.len(),
                    "Archive decompression budget exhausted, ignoring remaining entries"
                );
                break;
            }

            let limit = self.max_entry_bytes.min(remaining);
            let mut buffer = Vec::with_capacity(entry.size().min(limit) as usize);
            // One byte past the limit tells a cut member from one that fits exactly.
            let read = (&mut entry)
                .take(limit.saturating_add(1))
                .read_to_end(&mut buffer);
            if let Err(e) = read {
                tracing::warn!(entry = %name, error = %e, "Skipping corrupted archive entry");
                continue;
            }

            if buffer.len() as u64 > limit {
                buffer.truncate(limit as usize);
                tracing::warn!(
                    entry = %name,
                    declared_size = entry.size(),
                    kept_bytes = limit,
                    "Archive entry exceeds decompression limit, content cut"
                );
            }

            inflated += buffer.len() as u64;
            files.push(UploadedFile::new(name, decode_lossy(&buffer)));
        }

        Ok(files)
    }

    /// Source extension and no path segment inside an ignored directory.
    pub fn is_eligible(&self, entry_name: &str) -> bool {
        if !has_extension(&entry_name.to_lowercase(), &self.source_extensions) {
            return false;
        }

        !entry_name
            .split(['/', '\\'])
            .any(|segment| self.ignored_directories.iter().any(|dir| dir == segment))
    }
}

fn decode_lossy(data: &[u8]) -> String {
    String::from_utf8_lossy(data).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::{CompressionMethod, ZipWriter};

    fn extractor() -> ArchiveExtractor {
        ArchiveExtractor::new(vec!["py".into()], vec!["__pycache__".into()])
    }

    fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, data) in entries {
            if name.ends_with('/') {
                writer.add_directory(*name, options).unwrap();
            } else {
                writer.start_file(*name, options).unwrap();
                writer.write_all(data).unwrap();
            }
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn single_source_file_is_decoded_lossily() {
        let files = extractor()
            .extract(UploadKind::Source, "legacy.py", b"print 'hi'\n\xff\xfe")
            .unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].filename, "legacy.py");
        assert!(files[0].content.starts_with("print 'hi'\n"));
        assert!(files[0].content.contains('\u{FFFD}'));
    }

    #[test]
    fn archive_keeps_eligible_entries_in_archive_order() {
        let data = build_zip(&[
            ("pkg/", b""),
            ("pkg/zeta.py", b"import urllib2"),
            ("README.md", b"# readme"),
            ("pkg/__pycache__/zeta.cpython-311.py", b"cached"),
            ("pkg/alpha.py", b"print 'a'"),
            ("pkg/data.json", b"{}"),
            ("__pycache__/top.py", b"cached"),
            ("main.PY", b"x = 1"),
        ]);

        let files = extractor().extract(UploadKind::Archive, "p.zip", &data).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(names, vec!["pkg/zeta.py", "pkg/alpha.py", "main.PY"]);
        assert_eq!(files[0].content, "import urllib2");
    }

    #[test]
    fn corrupted_member_is_skipped() {
        let payload = b"CORRUPTED_PAYLOAD_MARKER print 'x'";
        let mut data = build_zip(&[
            ("good_one.py", b"print 'one'"),
            ("broken.py", payload),
            ("good_two.py", b"print 'two'"),
        ]);

        let start = data
            .windows(payload.len())
            .position(|w| w == payload)
            .expect("payload stored uncompressed");
        data[start] ^= 0xFF;

        let files = extractor().extract(UploadKind::Archive, "p.zip", &data).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(names, vec!["good_one.py", "good_two.py"]);
    }

    fn deflated_zip(entries: &[(&str, usize)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        let chunk = vec![b'#'; 64 * 1024];
        for (name, size) in entries {
            writer.start_file(*name, options).unwrap();
            let mut left = *size;
            while left > 0 {
                let n = left.min(chunk.len());
                writer.write_all(&chunk[..n]).unwrap();
                left -= n;
            }
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn highly_compressible_member_is_cut_at_entry_limit() {
        let data = deflated_zip(&[("bomb.py", 64 << 20), ("small.py", 10)]);
        assert!(data.len() < 1 << 20);

        let files = extractor()
            .with_limits(4096, 1 << 20)
            .extract(UploadKind::Archive, "p.zip", &data)
            .unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(names, vec!["bomb.py", "small.py"]);
        assert_eq!(files[0].content.len(), 4096);
        assert_eq!(files[1].content, "#".repeat(10));
    }

    #[test]
    fn member_exactly_at_limit_is_kept_whole() {
        let data = deflated_zip(&[("exact.py", 4096)]);
        let files = extractor()
            .with_limits(4096, 1 << 20)
            .extract(UploadKind::Archive, "p.zip", &data)
            .unwrap();
        assert_eq!(files[0].content.len(), 4096);
    }

    #[test]
    fn total_budget_bounds_the_whole_archive() {
        let entries: Vec<(String, usize)> =
            (0..50).map(|i| (format!("m{i:02}.py"), 1 << 20)).collect();
        let refs: Vec<(&str, usize)> = entries.iter().map(|(n, s)| (n.as_str(), *s)).collect();
        let data = deflated_zip(&refs);

        let files = extractor()
            .with_limits(1000, 2500)
            .extract(UploadKind::Archive, "p.zip", &data)
            .unwrap();
        let total: usize = files.iter().map(|f| f.content.len()).sum();
        assert_eq!(total, 2500);
        let names: Vec<&str> = files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(names, vec!["m00.py", "m01.py", "m02.py"]);
        assert_eq!(files[2].content.len(), 500);
    }

    #[test]
    fn archive_without_sources_is_no_source_files() {
        let data = build_zip(&[("notes.txt", b"hello"), ("__pycache__/a.py", b"x")]);
        assert_eq!(
            extractor().extract(UploadKind::Archive, "p.zip", &data),
            Err(ExtractionError::NoSourceFiles)
        );
    }

    #[test]
    fn garbage_archive_is_invalid() {
        let result = extractor().extract(UploadKind::Archive, "p.zip", b"definitely not a zip");
        assert!(matches!(result, Err(ExtractionError::InvalidArchive(_))));
    }

    #[test]
    fn eligibility_checks_every_segment() {
        let e = extractor();
        assert!(e.is_eligible("a/b/c.py"));
        assert!(e.is_eligible("not__pycache__/c.py"));
        assert!(!e.is_eligible("a/__pycache__/c.py"));
        assert!(!e.is_eligible("a\\__pycache__\\c.py"));
        assert!(!e.is_eligible("a/b/c.pyc"));
    }

    #[test]
    fn extraction_errors_map_to_distinct_app_errors() {
        use py3ready_core::{AppError, ErrorMetadata};

        let none: AppError = ExtractionError::NoSourceFiles.into();
        assert_eq!(none.error_code(), "NO_SOURCE_FILES");
        assert_eq!(none.client_message(), "No Python files found");

        let invalid: AppError = ExtractionError::InvalidArchive("bad".into()).into();
        assert_eq!(invalid.error_code(), "INVALID_ARCHIVE");
    }
}
