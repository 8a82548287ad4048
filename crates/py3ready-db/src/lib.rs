//! Persistence layer for py3ready
//!
//! Repository traits with PostgreSQL implementations for production and
//! in-memory implementations for tests and database-less local runs.

pub mod db;

pub use db::{
    InMemoryReportRepository, InMemoryUserRepository, PgReportRepository, PgUserRepository,
    ReportRepository, UserRepository,
};
