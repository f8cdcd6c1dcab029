//! Completion provider factory.
//!
//! Resolves the configured provider name to a concrete [`LlmClient`].

use crate::client::LlmClient;
use crate::providers::{GeminiClient, OllamaClient};
use docchat_core::{AppError, AppResult, CompletionServiceConfig};
use std::sync::Arc;
use std::time::Duration;

/// Default local Ollama endpoint.
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Create a completion client from configuration.
///
/// `api_key` is passed explicitly so callers decide where secrets come from;
/// the CLI resolves it through [`CompletionServiceConfig::api_key`].
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown, a required key is
/// missing, or the HTTP client cannot be built.
pub fn create_client(
    config: &CompletionServiceConfig,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn LlmClient>> {
    let timeout = Duration::from_secs(config.timeout_secs);

    match config.provider_name().as_str() {
        "gemini" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config(format!(
                    "Gemini completion provider requires an API key (set {})",
                    config.api_key_env.as_deref().unwrap_or("GEMINI_API_KEY")
                ))
            })?;
            let client = match config.endpoint.as_deref() {
                Some(endpoint) => GeminiClient::with_base_url(endpoint, api_key, timeout)?,
                None => GeminiClient::new(api_key, timeout)?,
            };
            Ok(Arc::new(client))
        }
        "ollama" => {
            let base_url = config.endpoint.as_deref().unwrap_or(DEFAULT_OLLAMA_URL);
            let client = OllamaClient::with_timeout(base_url, timeout)?;
            Ok(Arc::new(client))
        }
        other => Err(AppError::Config(format!(
            "Unknown completion provider: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: &str) -> CompletionServiceConfig {
        CompletionServiceConfig {
            provider: provider.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_ollama_client() {
        let client = create_client(&config("ollama"), None).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_create_ollama_with_custom_endpoint() {
        let mut cfg = config("ollama");
        cfg.endpoint = Some("http://localhost:8080".to_string());
        assert!(create_client(&cfg, None).is_ok());
    }

    #[test]
    fn test_gemini_requires_api_key() {
        match create_client(&config("gemini"), None) {
            Err(AppError::Config(msg)) => assert!(msg.contains("GEMINI_API_KEY")),
            Err(other) => panic!("Expected config error, got {other}"),
            Ok(_) => panic!("Expected error for Gemini without API key"),
        }
    }

    #[test]
    fn test_create_gemini_client() {
        let client = create_client(&config("gemini"), Some("key")).unwrap();
        assert_eq!(client.provider_name(), "gemini");
    }

    #[test]
    fn test_provider_name_case_insensitive() {
        let client = create_client(&config(" Ollama "), None).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_unknown_provider() {
        let result = create_client(&config("claude"), Some("key"));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
