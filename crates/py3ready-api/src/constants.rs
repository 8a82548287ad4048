//! Route prefixes shared by the router, handler annotations and tests.

/// API base path prefix
pub const API_BASE: &str = "/api";

pub const AUTH_PREFIX: &str = "/api/auth";

pub const MIGRATION_PREFIX: &str = "/api/migration";

/// Service name reported by the info endpoint and the OpenAPI document
pub const SERVICE_NAME: &str = "Python 2 to 3 Migration Analyzer";

/// Extra room on top of the upload limit for multipart boundaries and headers
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;
