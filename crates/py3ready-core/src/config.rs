//! Configuration module
//!
//! Environment-driven settings for the HTTP server, database, authentication,
//! upload intake and the model service.

use std::env;

const DEFAULT_PORT: u16 = 8000;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const JWT_EXPIRY_HOURS: i64 = 24;
const MAX_FILE_SIZE_MB: usize = 10;
const ANALYSIS_MAX_FILES: usize = 10;
const ANALYSIS_MAX_CHARS_PER_FILE: usize = 5000;
const ANALYSIS_TIMEOUT_SECS: u64 = 120;
const ANALYSIS_MAX_RETRIES: u32 = 2;

pub const DEFAULT_ARCHIVE_MAX_ENTRY_BYTES: u64 = 1024 * 1024;
pub const DEFAULT_ARCHIVE_MAX_TOTAL_BYTES: u64 = 32 * 1024 * 1024;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Upload intake rules
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub max_file_size_bytes: usize,
    /// Lowercase, without the leading dot
    pub source_extensions: Vec<String>,
    pub archive_extensions: Vec<String>,
    /// Archive path segments whose contents are never analyzed
    pub ignored_directories: Vec<String>,
    /// Inflated bytes kept per archive member
    pub archive_max_entry_bytes: u64,
    /// Inflated bytes read across one archive
    pub archive_max_total_bytes: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: MAX_FILE_SIZE_MB * 1024 * 1024,
            source_extensions: vec!["py".to_string()],
            archive_extensions: vec!["zip".to_string()],
            ignored_directories: vec!["__pycache__".to_string()],
            archive_max_entry_bytes: DEFAULT_ARCHIVE_MAX_ENTRY_BYTES,
            archive_max_total_bytes: DEFAULT_ARCHIVE_MAX_TOTAL_BYTES,
        }
    }
}

/// Model service settings. `api_key == None` disables analysis.
#[derive(Clone, Debug)]
pub struct AnalyzerConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub max_files: usize,
    pub max_chars_per_file: usize,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            max_files: ANALYSIS_MAX_FILES,
            max_chars_per_file: ANALYSIS_MAX_CHARS_PER_FILE,
            timeout_secs: ANALYSIS_TIMEOUT_SECS,
            max_retries: ANALYSIS_MAX_RETRIES,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub upload: UploadConfig,
    pub analyzer: AnalyzerConfig,
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173,http://localhost:3000".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let max_file_size_mb = env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| MAX_FILE_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_FILE_SIZE_MB);

        let upload = UploadConfig {
            max_file_size_bytes: megabytes_to_bytes(max_file_size_mb)?,
            source_extensions: parse_extension_list(
                &env::var("SOURCE_EXTENSIONS").unwrap_or_else(|_| "py".to_string()),
            ),
            archive_extensions: parse_extension_list(
                &env::var("ARCHIVE_EXTENSIONS").unwrap_or_else(|_| "zip".to_string()),
            ),
            ignored_directories: parse_list(
                &env::var("IGNORED_DIRECTORIES").unwrap_or_else(|_| "__pycache__".to_string()),
            ),
            archive_max_entry_bytes: env::var("ARCHIVE_MAX_ENTRY_BYTES")
                .unwrap_or_else(|_| DEFAULT_ARCHIVE_MAX_ENTRY_BYTES.to_string())
                .parse()
                .unwrap_or(DEFAULT_ARCHIVE_MAX_ENTRY_BYTES),
            archive_max_total_bytes: env::var("ARCHIVE_MAX_TOTAL_BYTES")
                .unwrap_or_else(|_| DEFAULT_ARCHIVE_MAX_TOTAL_BYTES.to_string())
                .parse()
                .unwrap_or(DEFAULT_ARCHIVE_MAX_TOTAL_BYTES),
        };

        let analyzer = AnalyzerConfig {
            api_key: env::var("GEMINI_API_KEY")
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            model: env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string()),
            max_files: env::var("ANALYSIS_MAX_FILES")
                .unwrap_or_else(|_| ANALYSIS_MAX_FILES.to_string())
                .parse()
                .unwrap_or(ANALYSIS_MAX_FILES),
            max_chars_per_file: env::var("ANALYSIS_MAX_CHARS_PER_FILE")
                .unwrap_or_else(|_| ANALYSIS_MAX_CHARS_PER_FILE.to_string())
                .parse()
                .unwrap_or(ANALYSIS_MAX_CHARS_PER_FILE),
            timeout_secs: env::var("ANALYSIS_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| ANALYSIS_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(ANALYSIS_TIMEOUT_SECS),
            max_retries: env::var("ANALYSIS_MAX_RETRIES")
                .unwrap_or_else(|_| ANALYSIS_MAX_RETRIES.to_string())
                .parse()
                .unwrap_or(ANALYSIS_MAX_RETRIES),
        };

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins: parse_list(&cors_origins_str),
            environment,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            jwt_expiry_hours: env::var("JWT_EXPIRY_HOURS")
                .unwrap_or_else(|_| JWT_EXPIRY_HOURS.to_string())
                .parse()
                .unwrap_or(JWT_EXPIRY_HOURS),
            upload,
            analyzer,
        };

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if !self.database_url.starts_with("postgresql://")
            && !self.database_url.starts_with("postgres://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.upload.source_extensions.is_empty() {
            return Err(anyhow::anyhow!("SOURCE_EXTENSIONS must not be empty"));
        }

        if self.upload.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }

        if self.upload.archive_max_entry_bytes == 0 || self.upload.archive_max_total_bytes == 0 {
            return Err(anyhow::anyhow!(
                "ARCHIVE_MAX_ENTRY_BYTES and ARCHIVE_MAX_TOTAL_BYTES must be greater than 0"
            ));
        }

        if self.analyzer.max_files == 0 || self.analyzer.max_chars_per_file == 0 {
            return Err(anyhow::anyhow!(
                "ANALYSIS_MAX_FILES and ANALYSIS_MAX_CHARS_PER_FILE must be greater than 0"
            ));
        }

        Ok(())
    }
}

fn megabytes_to_bytes(mb: usize) -> Result<usize, anyhow::Error> {
    mb.checked_mul(1024 * 1024)
        .ok_or_else(|| anyhow::anyhow!("MAX_FILE_SIZE_MB is too large: {}", mb))
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// `".PY, zip"` -> `["py", "zip"]`
fn parse_extension_list(raw: &str) -> Vec<String> {
    parse_list(raw)
        .into_iter()
        .map(|s| s.trim_start_matches('.').to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
