//! Database repositories for data access layer
//!
//! Each repository owns one table. Reports are always scoped to the owning user.

pub mod memory;
pub mod report;
pub mod user;

pub use memory::{InMemoryReportRepository, InMemoryUserRepository};
pub use report::{PgReportRepository, ReportRepository};
pub use user::{PgUserRepository, UserRepository};

/// Upper bound applied to every listing regardless of the caller's request
pub const MAX_LIST_LIMIT: i64 = 100;

/// Clamp a caller-supplied limit into `1..=MAX_LIST_LIMIT`.
pub fn clamp_limit(limit: i64) -> i64 {
    limit.clamp(1, MAX_LIST_LIMIT)
}
