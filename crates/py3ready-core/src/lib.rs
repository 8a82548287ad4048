//! py3ready Core Library
//!
//! Domain models, error types and configuration shared by every py3ready crate.

pub mod config;
pub mod error;
pub mod models;

pub use config::{AnalyzerConfig, Config, UploadConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
