use chrono::{DateTime, Utc};
use py3ready_core::models::{AnalysisResult, CodeIssue, MigrationReport, ReportSummary};
use py3ready_core::AppError;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::clamp_limit;

/// Storage boundary for migration reports.
///
/// Reports are immutable: there is no update operation. Every call is scoped
/// to `owner_id`, so a report owned by someone else behaves as missing.
#[async_trait::async_trait]
pub trait ReportRepository: Send + Sync {
    /// Insert a report; the identifier and timestamp are assigned here.
    async fn create(
        &self,
        owner_id: Uuid,
        result: &AnalysisResult,
    ) -> Result<MigrationReport, AppError>;

    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Option<MigrationReport>, AppError>;

    /// Most recent first, at most `limit` entries.
    async fn list(&self, owner_id: Uuid, limit: i64) -> Result<Vec<ReportSummary>, AppError>;

    /// Returns whether a report was actually removed.
    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<bool, AppError>;
}

#[derive(sqlx::FromRow)]
struct ReportRow {
    id: Uuid,
    owner_id: Uuid,
    is_valid_python3: bool,
    files_analyzed: Json<Vec<String>>,
    issues: Json<Vec<CodeIssue>>,
    summary: String,
    created_at: DateTime<Utc>,
}

impl From<ReportRow> for MigrationReport {
    fn from(row: ReportRow) -> Self {
        MigrationReport {
            id: row.id,
            owner_id: row.owner_id,
            is_valid_python3: row.is_valid_python3,
            files_analyzed: row.files_analyzed.0,
            issues: row.issues.0,
            summary: row.summary,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    id: Uuid,
    files_analyzed: Json<Vec<String>>,
    is_valid_python3: bool,
    issues_count: i64,
    created_at: DateTime<Utc>,
}

impl From<SummaryRow> for ReportSummary {
    fn from(row: SummaryRow) -> Self {
        ReportSummary {
            id: row.id,
            files_analyzed: row.files_analyzed.0,
            is_valid_python3: row.is_valid_python3,
            issues_count: row.issues_count,
            created_at: row.created_at,
        }
    }
}

const REPORT_COLUMNS: &str =
    "id, owner_id, is_valid_python3, files_analyzed, issues, summary, created_at";

/// PostgreSQL-backed report repository
#[derive(Clone)]
pub struct PgReportRepository {
    pool: PgPool,
}

impl PgReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ReportRepository for PgReportRepository {
    #[tracing::instrument(skip(self, result), fields(db.table = "migration_reports", db.operation = "insert"))]
    async fn create(
        &self,
        owner_id: Uuid,
        result: &AnalysisResult,
    ) -> Result<MigrationReport, AppError> {
        let row = sqlx::query_as::<Postgres, ReportRow>(&format!(
            r#"
            INSERT INTO migration_reports (owner_id, is_valid_python3, files_analyzed, issues, summary)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {REPORT_COLUMNS}
            "#
        ))
        .bind(owner_id)
        .bind(result.is_valid_python3)
        .bind(Json(&result.files_analyzed))
        .bind(Json(&result.issues))
        .bind(&result.summary)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(report_id = %row.id, "Migration report stored");
        Ok(row.into())
    }

    #[tracing::instrument(skip(self), fields(db.table = "migration_reports", db.operation = "select", db.record_id = %id))]
    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Option<MigrationReport>, AppError> {
        let row = sqlx::query_as::<Postgres, ReportRow>(&format!(
            "SELECT {REPORT_COLUMNS} FROM migration_reports WHERE owner_id = $1 AND id = $2"
        ))
        .bind(owner_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    #[tracing::instrument(skip(self), fields(db.table = "migration_reports", db.operation = "select"))]
    async fn list(&self, owner_id: Uuid, limit: i64) -> Result<Vec<ReportSummary>, AppError> {
        let rows = sqlx::query_as::<Postgres, SummaryRow>(
            r#"
            SELECT id, files_analyzed, is_valid_python3,
                   jsonb_array_length(issues)::BIGINT AS issues_count, created_at
            FROM migration_reports
            WHERE owner_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(owner_id)
        .bind(clamp_limit(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[tracing::instrument(skip(self), fields(db.table = "migration_reports", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let rows_affected =
            sqlx::query("DELETE FROM migration_reports WHERE owner_id = $1 AND id = $2")
                .bind(owner_id)
                .bind(id)
                .execute(&self.pool)
                .await?
                .rows_affected();

        Ok(rows_affected > 0)
    }
}
