//! Offline embedding provider using trigram-based content-aware embeddings.

use crate::embeddings::provider::EmbeddingProvider;
use crate::types::{EmbeddingMode, EmbeddingVector};
use docchat_core::AppResult;
use std::collections::{HashMap, HashSet};

/// Default vector dimension of the mock provider.
pub const MOCK_DIMENSIONS: usize = 384;

const STOP_WORDS: [&str; 32] = [
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them",
];

/// Deterministic provider for demos and tests.
///
/// Hashes character trigrams and whole words into a fixed number of
/// dimensions and normalizes the result. Not semantically accurate, but
/// texts sharing words land close together. The mode is ignored.
#[derive(Debug)]
pub struct MockProvider {
    dimensions: usize,
}

impl MockProvider {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn generate(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0; self.dimensions];

        let lower = text.to_lowercase();
        let stop_words: HashSet<&str> = STOP_WORDS.iter().copied().collect();

        let mut word_freq: HashMap<&str, u32> = HashMap::new();
        for word in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !stop_words.contains(w) && w.chars().count() > 2)
        {
            *word_freq.entry(word).or_insert(0) += 1;
        }

        for (word, freq) in &word_freq {
            let chars: Vec<char> = word.chars().collect();
            for trigram in chars.windows(3) {
                let hash = trigram
                    .iter()
                    .fold(0u64, |acc, c| acc.wrapping_mul(37).wrapping_add(*c as u64));
                embedding[(hash as usize) % self.dimensions] += (*freq as f32).sqrt();
            }

            let word_hash = word
                .bytes()
                .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
            embedding[(word_hash as usize) % self.dimensions] += *freq as f32;
        }

        // Normalize to unit vector
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new(MOCK_DIMENSIONS)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    async fn embed(&self, text: &str, _mode: EmbeddingMode) -> AppResult<EmbeddingVector> {
        Ok(EmbeddingVector::new(self.generate(text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(v: &EmbeddingVector) -> f32 {
        v.values.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    #[tokio::test]
    async fn test_mock_provider_unit_vectors() {
        let provider = MockProvider::default();
        let embedding = provider.embed_document("hello world").await.unwrap();

        assert_eq!(embedding.dimension(), MOCK_DIMENSIONS);
        assert!((norm(&embedding) - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_mock_provider_deterministic() {
        let provider = MockProvider::new(64);
        let first = provider.embed_document("deterministic test").await.unwrap();
        let second = provider.embed_document("deterministic test").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_mock_provider_different_texts() {
        let provider = MockProvider::default();
        let hello = provider.embed_document("hello world").await.unwrap();
        let goodbye = provider.embed_document("goodbye world").await.unwrap();
        assert_ne!(hello, goodbye);
    }

    #[tokio::test]
    async fn test_mock_provider_empty_text() {
        let provider = MockProvider::default();
        let embedding = provider.embed_document("").await.unwrap();
        assert!(embedding.values.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn test_mock_provider_utf8_safety() {
        let provider = MockProvider::default();
        let embedding = provider
            .embed_document("Gamedex é um aplicativo 🎮 brasileiro para gerenciar jogos!")
            .await
            .unwrap();
        assert!((norm(&embedding) - 1.0).abs() < 0.001);
    }
}
