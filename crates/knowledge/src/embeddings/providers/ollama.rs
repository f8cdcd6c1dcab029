//! Ollama Embedding Provider
//!
//! Provides semantic embeddings via Ollama's local API using models like
//! nomic-embed-text. Ollama has no query/document distinction, so the mode is
//! ignored.

use super::{http_client, status_error, transport_error, with_retries};
use crate::embeddings::provider::{validate_vector, EmbeddingProvider};
use crate::types::{EmbeddingMode, EmbeddingVector};
use docchat_core::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Ollama API endpoint for embeddings
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const EMBEDDING_ENDPOINT: &str = "/api/embeddings";

/// Ollama embedding provider using local API
#[derive(Debug, Clone)]
pub struct OllamaEmbeddingProvider {
    /// HTTP client for API requests
    client: Client,
    /// Ollama API base URL
    base_url: String,
    /// Model name (e.g., "nomic-embed-text")
    model: String,
    max_retries: u32,
}

/// Request payload for Ollama embeddings API
#[derive(Debug, Clone, Serialize)]
struct EmbeddingRequest {
    model: String,
    prompt: String,
}

/// Response from Ollama embeddings API
#[derive(Debug, Clone, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

impl OllamaEmbeddingProvider {
    pub fn new(
        base_url: Option<&str>,
        model: &str,
        timeout: Duration,
        max_retries: u32,
    ) -> AppResult<Self> {
        Ok(Self {
            client: http_client("Ollama", timeout)?,
            base_url: base_url
                .unwrap_or(DEFAULT_OLLAMA_URL)
                .trim_end_matches('/')
                .to_string(),
            model: model.to_string(),
            max_retries,
        })
    }

    /// Embed single text (no retries)
    #[instrument(skip(self, text), fields(text_len = text.len(), model = %self.model))]
    async fn embed_single(&self, text: &str) -> AppResult<EmbeddingVector> {
        let url = format!("{}{}", self.base_url, EMBEDDING_ENDPOINT);

        let request = EmbeddingRequest {
            model: self.model.clone(),
            prompt: text.to_string(),
        };

        debug!("Sending embedding request to {}", url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error("Ollama", e))?;

        if !response.status().is_success() {
            return Err(status_error("Ollama", response).await);
        }

        let body: EmbeddingResponse = response.json().await.map_err(|e| {
            AppError::EmbeddingService(format!("Failed to parse Ollama response: {}", e))
        })?;

        debug!("Received {} dimensional embedding", body.embedding.len());

        validate_vector("Ollama", body.embedding)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for OllamaEmbeddingProvider {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str, _mode: EmbeddingMode) -> AppResult<EmbeddingVector> {
        with_retries(self.max_retries, || self.embed_single(text)).await
    }
}
