//! Upload-to-report pipeline
//!
//! classify → size check → extract → analyze → persist. Every step before
//! persistence is fallible, and nothing is stored unless all of them succeed.

use crate::state::AppState;
use bytes::Bytes;
use py3ready_core::models::{AnalysisResponse, MigrationReport, UploadedFile};
use py3ready_core::AppError;
use py3ready_db::ReportRepository;
use py3ready_services::{AnalysisService, ArchiveExtractor, UploadKind, UploadValidator};
use std::sync::Arc;
use uuid::Uuid;

pub struct MigrationService {
    validator: UploadValidator,
    extractor: ArchiveExtractor,
    analysis: AnalysisService,
    reports: Arc<dyn ReportRepository>,
}

impl MigrationService {
    pub fn new(state: &AppState) -> Self {
        Self {
            validator: state.upload.validator.clone(),
            extractor: state.upload.extractor.clone(),
            analysis: state.analysis.clone(),
            reports: state.reports.clone(),
        }
    }

    #[tracing::instrument(skip(self, data), fields(upload = %filename, size = data.len()))]
    pub async fn analyze_upload(
        &self,
        owner_id: Uuid,
        filename: &str,
        data: Bytes,
    ) -> Result<AnalysisResponse, AppError> {
        let kind = self.validator.classify(filename)?;
        self.validator.validate_size(data.len())?;

        let files = self.extract(kind, filename, data).await?;
        let result = self.analysis.analyze(&files).await?;
        let report = self.reports.create(owner_id, &result).await?;

        tracing::info!(
            report_id = %report.id,
            files = report.files_analyzed.len(),
            issues = report.issues_count(),
            "Migration report stored"
        );

        Ok(AnalysisResponse::for_report(&report))
    }

    pub async fn get_report(&self, owner_id: Uuid, id: Uuid) -> Result<MigrationReport, AppError> {
        self.reports
            .get(owner_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Report not found".to_string()))
    }

    pub async fn delete_report(&self, owner_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if self.reports.delete(owner_id, id).await? {
            tracing::info!(report_id = %id, "Migration report deleted");
            Ok(())
        } else {
            Err(AppError::NotFound("Report not found".to_string()))
        }
    }

    /// Archive decompression runs on the blocking pool.
    async fn extract(
        &self,
        kind: UploadKind,
        filename: &str,
        data: Bytes,
    ) -> Result<Vec<UploadedFile>, AppError> {
        match kind {
            UploadKind::Source => Ok(self.extractor.extract(kind, filename, &data)?),
            UploadKind::Archive => {
                let extractor = self.extractor.clone();
                let filename = filename.to_string();
                let files = tokio::task::spawn_blocking(move || {
                    extractor.extract(kind, &filename, &data)
                })
                .await
                .map_err(|e| AppError::InternalWithSource {
                    message: "Archive extraction task failed".to_string(),
                    source: anyhow::Error::new(e),
                })??;
                Ok(files)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use py3ready_core::models::{AnalysisResult, ReportSummary};
    use py3ready_core::{Config, UploadConfig};
    use py3ready_db::{InMemoryReportRepository, InMemoryUserRepository};
    use py3ready_services::RequestLimits;

    /// Fails the test if the pipeline ever reaches persistence.
    struct UnreachableReports;

    #[async_trait::async_trait]
    impl ReportRepository for UnreachableReports {
        async fn create(&self, _: Uuid, _: &AnalysisResult) -> Result<MigrationReport, AppError> {
            panic!("nothing should be stored");
        }
        async fn get(&self, _: Uuid, _: Uuid) -> Result<Option<MigrationReport>, AppError> {
            Ok(None)
        }
        async fn list(&self, _: Uuid, _: i64) -> Result<Vec<ReportSummary>, AppError> {
            Ok(Vec::new())
        }
        async fn delete(&self, _: Uuid, _: Uuid) -> Result<bool, AppError> {
            Ok(false)
        }
    }

    fn config() -> Config {
        Config {
            server_port: 0,
            cors_origins: vec!["*".into()],
            environment: "test".into(),
            database_url: "postgres://unused".into(),
            db_max_connections: 1,
            db_timeout_seconds: 1,
            jwt_secret: "test-secret-that-is-at-least-32-characters".into(),
            jwt_expiry_hours: 1,
            upload: UploadConfig {
                max_file_size_bytes: 64,
                ..UploadConfig::default()
            },
            analyzer: Default::default(),
        }
    }

    fn service(reports: Arc<dyn ReportRepository>) -> MigrationService {
        let state = AppState::new(
            config(),
            Arc::new(InMemoryUserRepository::new()),
            reports,
            AnalysisService::new(None, RequestLimits::default()),
        );
        MigrationService::new(&state)
    }

    #[tokio::test]
    async fn rejected_uploads_store_nothing() {
        let service = service(Arc::new(UnreachableReports));
        let owner = Uuid::new_v4();

        let err = service
            .analyze_upload(owner, "notes.txt", Bytes::from_static(b"hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFileType(_)));

        let err = service
            .analyze_upload(owner, "big.py", Bytes::from(vec![b'x'; 65]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge(_)));

        let err = service
            .analyze_upload(owner, "broken.zip", Bytes::from_static(b"not a zip"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidArchive(_)));

        let err = service
            .analyze_upload(owner, "legacy.py", Bytes::from_static(b"print 'x'"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AnalyzerNotConfigured(_)));
    }

    #[tokio::test]
    async fn missing_and_deleted_reports_are_not_found() {
        let reports = Arc::new(InMemoryReportRepository::new());
        let service = service(reports.clone());
        let owner = Uuid::new_v4();

        let result = AnalysisResult {
            is_valid_python3: true,
            files_analyzed: vec!["a.py".into()],
            issues: Vec::new(),
            summary: "Clean".into(),
        };
        let report = reports.create(owner, &result).await.unwrap();

        assert_eq!(service.get_report(owner, report.id).await.unwrap().id, report.id);
        service.delete_report(owner, report.id).await.unwrap();
        assert!(matches!(
            service.delete_report(owner, report.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.get_report(owner, report.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
