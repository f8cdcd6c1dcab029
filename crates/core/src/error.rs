//! Error types for docchat.
//!
//! This module defines a unified error enum covering every failure the
//! retrieval pipeline can report: configuration, text extraction, the
//! embedding and completion services, index construction and session misuse.

use thiserror::Error;

/// Unified error type for docchat.
///
/// All fallible functions return `Result<T, AppError>`. No variant is fatal to
/// the process; each one is reported to the immediate caller.
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid configuration (chunk size/overlap, providers, timeouts)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Text extraction from an uploaded document failed
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// The embedding service failed, timed out or returned a malformed vector
    #[error("Embedding service error: {0}")]
    EmbeddingService(String),

    /// Vectors within one index (or a query) disagree on dimension or count
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// The completion service failed or timed out
    #[error("Completion service error: {0}")]
    CompletionService(String),

    /// A question was asked before any document was processed
    #[error("No index: upload and process a document first")]
    NoIndex,

    /// Prompt template errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_index_message() {
        let err = AppError::NoIndex;
        assert!(err.to_string().contains("upload"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.pdf");
        let err: AppError = io.into();
        assert!(matches!(err, AppError::Io(_)));
        assert!(err.to_string().contains("missing.pdf"));
    }

    #[test]
    fn test_json_conversion() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: AppError = parse.into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
