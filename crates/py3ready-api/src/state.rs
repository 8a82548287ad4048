//! Application state shared by every handler.
//!
//! All handles are constructed once at startup and are cheap to clone.

use crate::auth::password::DEFAULT_COST;
use crate::auth::JwtService;
use py3ready_core::Config;
use py3ready_db::{ReportRepository, UserRepository};
use py3ready_services::{AnalysisService, ArchiveExtractor, UploadValidator};
use std::sync::Arc;

/// Upload intake: name/size checks and archive reading.
#[derive(Clone)]
pub struct UploadState {
    pub validator: UploadValidator,
    pub extractor: ArchiveExtractor,
}

#[derive(Clone)]
pub struct AuthState {
    pub jwt: JwtService,
    pub users: Arc<dyn UserRepository>,
    /// bcrypt work factor for new password hashes
    pub password_cost: u32,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub auth: AuthState,
    pub upload: UploadState,
    pub analysis: AnalysisService,
    pub reports: Arc<dyn ReportRepository>,
}

impl AppState {
    pub fn new(
        config: Config,
        users: Arc<dyn UserRepository>,
        reports: Arc<dyn ReportRepository>,
        analysis: AnalysisService,
    ) -> Self {
        let jwt = JwtService::new(&config.jwt_secret, config.jwt_expiry_hours);
        let upload = UploadState {
            validator: UploadValidator::from_config(&config.upload),
            extractor: ArchiveExtractor::from_config(&config.upload),
        };

        Self {
            auth: AuthState {
                jwt,
                users,
                password_cost: DEFAULT_COST,
            },
            upload,
            analysis,
            reports,
            config,
        }
    }

    pub fn with_password_cost(mut self, cost: u32) -> Self {
        self.auth.password_cost = cost;
        self
    }
}
