//! Embedding provider implementations.

pub mod gemini;
pub mod mock;
pub mod ollama;

pub use gemini::GeminiEmbeddingProvider;
pub use mock::MockProvider;
pub use ollama::OllamaEmbeddingProvider;

use docchat_core::{AppError, AppResult};
use std::future::Future;
use std::time::Duration;

/// Initial backoff duration in milliseconds
const INITIAL_BACKOFF_MS: u64 = 100;

/// Run `op` once, then up to `max_retries` more times with exponential backoff.
pub(crate) async fn with_retries<T, F, Fut>(max_retries: u32, mut op: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut attempt = 0;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_retries => {
                attempt += 1;
                let backoff_ms = INITIAL_BACKOFF_MS * 2_u64.pow(attempt - 1);
                tracing::warn!(
                    "Embedding failed (attempt {}/{}), retrying in {}ms: {}",
                    attempt,
                    max_retries + 1,
                    backoff_ms,
                    e
                );
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Map a transport failure to an embedding error, calling out timeouts.
pub(crate) fn transport_error(provider: &str, err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::EmbeddingService(format!("{} embedding request timed out: {}", provider, err))
    } else {
        AppError::EmbeddingService(format!("Failed to send request to {}: {}", provider, err))
    }
}

fn http_client(provider: &str, timeout: Duration) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AppError::Config(format!("Failed to create HTTP client for {}: {}", provider, e)))
}

/// Read a non-2xx response body into an embedding error.
async fn status_error(provider: &str, response: reqwest::Response) -> AppError {
    let status = response.status();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    AppError::EmbeddingService(format!("{} API error ({}): {}", provider, status, error_text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_no_retries_by_default() {
        let calls = AtomicU32::new(0);
        let result: AppResult<()> = with_retries(0, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(AppError::EmbeddingService("down".to_string()))
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let calls = AtomicU32::new(0);
        let result = with_retries(2, || async {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(AppError::EmbeddingService("flaky".to_string()))
            } else {
                Ok(n)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
