//! Data models for the application

mod migration;
mod user;

pub use migration::*;
pub use user::*;
