//! Docchat Core Library
//!
//! This crate provides the foundational utilities shared by every docchat crate:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management (service, retrieval and logging settings)

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{AppConfig, CompletionServiceConfig, EmbeddingServiceConfig, RetrievalConfig};
pub use error::{AppError, AppResult};
