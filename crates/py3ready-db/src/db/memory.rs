//! In-memory repositories
//!
//! Same contracts as the PostgreSQL repositories, backed by process memory.
//! Used by the API tests and for running the service without a database.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use py3ready_core::models::{AnalysisResult, MigrationReport, NewUser, ReportSummary, User};
use py3ready_core::AppError;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{clamp_limit, ReportRepository, UserRepository};

#[derive(Clone, Default)]
pub struct InMemoryReportRepository {
    // Insertion order; listing breaks created_at ties by it.
    reports: Arc<RwLock<Vec<MigrationReport>>>,
}

impl InMemoryReportRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.reports.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.reports.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl ReportRepository for InMemoryReportRepository {
    async fn create(
        &self,
        owner_id: Uuid,
        result: &AnalysisResult,
    ) -> Result<MigrationReport, AppError> {
        let report = MigrationReport {
            id: Uuid::new_v4(),
            owner_id,
            is_valid_python3: result.is_valid_python3,
            files_analyzed: result.files_analyzed.clone(),
            issues: result.issues.clone(),
            summary: result.summary.clone(),
            created_at: Utc::now(),
        };
        self.reports.write().await.push(report.clone());
        Ok(report)
    }

    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Option<MigrationReport>, AppError> {
        let reports = self.reports.read().await;
        Ok(reports
            .iter()
            .find(|r| r.owner_id == owner_id && r.id == id)
            .cloned())
    }

    async fn list(&self, owner_id: Uuid, limit: i64) -> Result<Vec<ReportSummary>, AppError> {
        let reports = self.reports.read().await;
        let mut owned: Vec<&MigrationReport> = reports
            .iter()
            .rev()
            .filter(|r| r.owner_id == owner_id)
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(owned
            .into_iter()
            .take(clamp_limit(limit) as usize)
            .map(ReportSummary::from)
            .collect())
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut reports = self.reports.write().await;
        let before = reports.len();
        reports.retain(|r| !(r.owner_id == owner_id && r.id == id));
        Ok(reports.len() < before)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the active flag of an existing user.
    pub async fn set_active(&self, id: Uuid, is_active: bool) -> bool {
        match self.users.write().await.get_mut(&id) {
            Some(user) => {
                user.is_active = is_active;
                true
            }
            None => false,
        }
    }
}

#[async_trait::async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let created = User {
            id: Uuid::new_v4(),
            email: user.email,
            username: user.username,
            hashed_password: user.hashed_password,
            is_active: true,
            created_at: Utc::now(),
        };
        users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(&id).cloned())
    }
}
