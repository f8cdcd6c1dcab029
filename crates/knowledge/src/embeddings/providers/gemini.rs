//! Gemini embedding provider (Generative Language `embedContent`).

use super::{http_client, status_error, transport_error, with_retries};
use crate::embeddings::provider::{validate_vector, EmbeddingProvider};
use crate::types::{EmbeddingMode, EmbeddingVector};
use docchat_core::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedContentRequest {
    model: String,
    content: Content,
    task_type: &'static str,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: ContentEmbedding,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

/// Embedding provider backed by the Gemini API.
#[derive(Clone)]
pub struct GeminiEmbeddingProvider {
    client: Client,
    base_url: String,
    /// Model resource name (e.g., "models/embedding-001")
    model: String,
    api_key: String,
    max_retries: u32,
}

impl GeminiEmbeddingProvider {
    pub fn new(
        base_url: Option<&str>,
        model: &str,
        api_key: &str,
        timeout: Duration,
        max_retries: u32,
    ) -> AppResult<Self> {
        let model = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{}", model)
        };

        Ok(Self {
            client: http_client("Gemini", timeout)?,
            base_url: base_url
                .unwrap_or(DEFAULT_GEMINI_URL)
                .trim_end_matches('/')
                .to_string(),
            model,
            api_key: api_key.to_string(),
            max_retries,
        })
    }

    fn task_type(mode: EmbeddingMode) -> &'static str {
        match mode {
            EmbeddingMode::Document => "RETRIEVAL_DOCUMENT",
            EmbeddingMode::Query => "RETRIEVAL_QUERY",
        }
    }

    fn build_request(&self, text: &str, mode: EmbeddingMode) -> EmbedContentRequest {
        EmbedContentRequest {
            model: self.model.clone(),
            content: Content {
                parts: vec![Part {
                    text: text.to_string(),
                }],
            },
            task_type: Self::task_type(mode),
        }
    }

    #[instrument(skip(self, text), fields(text_len = text.len(), mode = mode.as_str()))]
    async fn embed_single(&self, text: &str, mode: EmbeddingMode) -> AppResult<EmbeddingVector> {
        let url = format!("{}/{}:embedContent", self.base_url, self.model);
        let request = self.build_request(text, mode);

        debug!("Sending embedding request to {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error("Gemini", e))?;

        if !response.status().is_success() {
            return Err(status_error("Gemini", response).await);
        }

        let body: EmbedContentResponse = response.json().await.map_err(|e| {
            AppError::EmbeddingService(format!("Failed to parse Gemini embedding response: {}", e))
        })?;

        validate_vector("Gemini", body.embedding.values)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for GeminiEmbeddingProvider {
    fn provider_name(&self) -> &str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str, mode: EmbeddingMode) -> AppResult<EmbeddingVector> {
        with_retries(self.max_retries, || self.embed_single(text, mode)).await
    }
}

impl std::fmt::Debug for GeminiEmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiEmbeddingProvider")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(model: &str) -> GeminiEmbeddingProvider {
        GeminiEmbeddingProvider::new(None, model, "key", Duration::from_secs(5), 0).unwrap()
    }

    #[test]
    fn test_model_prefix_normalized() {
        assert_eq!(provider("embedding-001").model_name(), "models/embedding-001");
        assert_eq!(provider("models/embedding-001").model_name(), "models/embedding-001");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let p = GeminiEmbeddingProvider::new(
            None,
            "embedding-001",
            "sk-very-secret",
            Duration::from_secs(5),
            0,
        )
        .unwrap();

        let shown = format!("{:?}", p);
        assert!(!shown.contains("sk-very-secret"));
        assert!(shown.contains("<redacted>"));
        assert!(shown.contains("models/embedding-001"));

        let retriever = crate::retriever::Retriever::new(std::sync::Arc::new(p), Default::default());
        assert!(!format!("{:?}", retriever).contains("sk-very-secret"));
    }

    #[test]
    fn test_request_task_types() {
        let p = provider("models/embedding-001");

        let doc = serde_json::to_value(p.build_request("chunk", EmbeddingMode::Document)).unwrap();
        assert_eq!(doc["taskType"], "RETRIEVAL_DOCUMENT");
        assert_eq!(doc["model"], "models/embedding-001");
        assert_eq!(doc["content"]["parts"][0]["text"], "chunk");

        let query = serde_json::to_value(p.build_request("why?", EmbeddingMode::Query)).unwrap();
        assert_eq!(query["taskType"], "RETRIEVAL_QUERY");
    }

    #[test]
    fn test_response_parsing() {
        let body: EmbedContentResponse =
            serde_json::from_str(r#"{"embedding": {"values": [0.1, -0.2, 0.3]}}"#).unwrap();
        assert_eq!(body.embedding.values.len(), 3);

        let bad = serde_json::from_str::<EmbedContentResponse>(
            r#"{"embedding": {"values": ["a", "b"]}}"#,
        );
        assert!(bad.is_err());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_embedding_error() {
        let p = GeminiEmbeddingProvider::new(
            Some("http://127.0.0.1:9"),
            "embedding-001",
            "key",
            Duration::from_secs(2),
            0,
        )
        .unwrap();

        let result = p.embed_document("text").await;
        assert!(matches!(result, Err(AppError::EmbeddingService(_))));
    }
}
