//! Embedding provider trait and factory.

use super::providers::{GeminiEmbeddingProvider, MockProvider, OllamaEmbeddingProvider};
use crate::types::{EmbeddingMode, EmbeddingVector};
use docchat_core::{AppError, AppResult, EmbeddingServiceConfig};
use std::sync::Arc;
use std::time::Duration;

/// Trait for embedding providers.
///
/// Every call is an independent round trip; nothing is cached. Transport
/// failures, timeouts, non-2xx statuses and malformed vectors are all
/// reported as `AppError::EmbeddingService`.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "gemini", "ollama", "mock")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Embed a single text.
    async fn embed(&self, text: &str, mode: EmbeddingMode) -> AppResult<EmbeddingVector>;

    /// Embed a chunk for storage in an index.
    async fn embed_document(&self, text: &str) -> AppResult<EmbeddingVector> {
        self.embed(text, EmbeddingMode::Document).await
    }

    /// Embed a question for searching an index.
    async fn embed_query(&self, text: &str) -> AppResult<EmbeddingVector> {
        self.embed(text, EmbeddingMode::Query).await
    }
}

/// Create an embedding provider based on configuration.
pub fn create_provider(
    config: &EmbeddingServiceConfig,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    let timeout = Duration::from_secs(config.timeout_secs);

    match config.provider_name().as_str() {
        "gemini" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config(format!(
                    "Gemini embedding provider requires an API key (set {})",
                    config.api_key_env.as_deref().unwrap_or("GEMINI_API_KEY")
                ))
            })?;
            let provider = GeminiEmbeddingProvider::new(
                config.endpoint.as_deref(),
                &config.model,
                api_key,
                timeout,
                config.max_retries,
            )?;
            Ok(Arc::new(provider))
        }

        "ollama" => {
            let provider = OllamaEmbeddingProvider::new(
                config.endpoint.as_deref(),
                &config.model,
                timeout,
                config.max_retries,
            )?;
            Ok(Arc::new(provider))
        }

        "mock" => Ok(Arc::new(MockProvider::default())),

        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: gemini, ollama, mock",
            config.provider
        ))),
    }
}

/// Check a vector returned by a remote service.
pub(crate) fn validate_vector(provider: &str, values: Vec<f32>) -> AppResult<EmbeddingVector> {
    if values.is_empty() {
        return Err(AppError::EmbeddingService(format!(
            "{} returned an empty embedding",
            provider
        )));
    }

    if values.iter().any(|v| !v.is_finite()) {
        return Err(AppError::EmbeddingService(format!(
            "{} returned a non-finite embedding component",
            provider
        )));
    }

    Ok(EmbeddingVector::new(values))
}
