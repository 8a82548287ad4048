//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use py3ready_core::Config;
use sqlx::PgPool;
use std::sync::Arc;

/// Everything `main` needs to serve: shared state, the router and the pool to close on exit.
pub struct App {
    pub state: Arc<AppState>,
    pub router: axum::Router,
    pub pool: PgPool,
}

/// Validate configuration, then bring up telemetry, database, services and routes in that order.
pub async fn initialize_app(config: Config) -> Result<App> {
    validation::validate_config(&config).context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.is_production())?;
    tracing::info!(
        environment = %config.environment,
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;
    let state = services::initialize_services(&config, pool.clone())?;
    let router = routes::setup_routes(&config, state.clone())?;

    Ok(App {
        state,
        router,
        pool,
    })
}
