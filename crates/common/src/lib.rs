//! PaperDash Common Library
//!
//! Shared code behind the paper dashboard:
//! - Paper and rating models
//! - Rating store over a durable key-value slot
//! - Paper fetch service with pluggable sources
//! - Chat-with-paper stub
//! - Error types, configuration and metrics

pub mod chat;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod papers;
pub mod ratings;
pub mod storage;

// Re-export commonly used types
pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use models::{Paper, RatingRecord};
pub use papers::PaperService;
pub use ratings::RatingStore;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
