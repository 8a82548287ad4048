//! Startup configuration checks

use anyhow::Result;
use py3ready_core::Config;

/// Fail fast on settings that would break or weaken the running service.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.is_production() && config.cors_origins.iter().any(|o| o == "*") {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production. \
            Set specific allowed origins via CORS_ORIGINS."
        ));
    }

    if config.db_max_connections == 0 {
        return Err(anyhow::anyhow!("Database max connections cannot be 0"));
    }

    if config.db_timeout_seconds == 0 {
        return Err(anyhow::anyhow!("Database timeout cannot be 0"));
    }

    if config.jwt_expiry_hours <= 0 {
        return Err(anyhow::anyhow!("JWT_EXPIRY_HOURS must be greater than 0"));
    }

    if config.analyzer.api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY not set; analysis requests will fail with 503");
    }

    if config.analyzer.timeout_secs == 0 {
        return Err(anyhow::anyhow!("ANALYSIS_TIMEOUT_SECONDS must be greater than 0"));
    }

    Ok(())
}
