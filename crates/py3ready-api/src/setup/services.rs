//! Service and repository construction

use crate::state::AppState;
use anyhow::{Context, Result};
use py3ready_core::Config;
use py3ready_db::{PgReportRepository, PgUserRepository};
use py3ready_services::AnalysisService;
use sqlx::PgPool;
use std::sync::Arc;

pub fn initialize_services(config: &Config, pool: PgPool) -> Result<Arc<AppState>> {
    let analysis = AnalysisService::from_config(&config.analyzer)
        .context("Failed to initialize analysis service")?;

    let state = AppState::new(
        config.clone(),
        Arc::new(PgUserRepository::new(pool.clone())),
        Arc::new(PgReportRepository::new(pool)),
        analysis,
    );

    tracing::info!(
        analyzer_enabled = state.analysis.is_enabled(),
        max_files = state.analysis.limits().max_files,
        "Services initialized"
    );

    Ok(Arc::new(state))
}
