//! Retrieval-augmented question answering over uploaded documents.
//!
//! Text is extracted, chunked, embedded and held in an in-memory similarity
//! index. Questions are embedded, matched against the index, and answered by
//! a completion model grounded in the retrieved chunks.

pub mod chunker;
pub mod embeddings;
pub mod flat_index;
pub mod parser;
pub mod progress;
pub mod rag;
pub mod retriever;
pub mod session;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use chunker::{ChunkConfig, TextChunker};
pub use embeddings::{create_provider, EmbeddingProvider};
pub use flat_index::SimilarityIndex;
pub use progress::{ProgressEvent, ProgressReporter};
pub use rag::AnswerSynthesizer;
pub use retriever::{Retriever, DEFAULT_TOP_K};
pub use session::{IndexHandle, Session};
pub use types::{Chunk, EmbeddingMode, EmbeddingVector, Speaker, TranscriptEntry};
pub use vector_index::{SearchHit, VectorIndex};

use docchat_core::{AppConfig, AppResult};
use docchat_prompt::PromptDefinition;

/// Wire a session from application configuration.
///
/// API keys are resolved from the environment variables named in the config.
/// `prompt` replaces the built-in grounding prompt when given.
pub fn session_from_config(
    config: &AppConfig,
    prompt: Option<PromptDefinition>,
    progress: ProgressReporter,
) -> AppResult<Session> {
    config.validate()?;

    let embedder = create_provider(&config.embedding, config.embedding.api_key().as_deref())?;
    let retriever = Retriever::new(embedder, config.retrieval.clone()).with_progress(progress);

    let client = docchat_llm::create_client(
        &config.completion,
        config.completion.api_key().as_deref(),
    )?;
    let mut synthesizer = AnswerSynthesizer::from_config(client, &config.completion);
    if let Some(prompt) = prompt {
        synthesizer = synthesizer.with_prompt(prompt);
    }

    tracing::debug!(
        embedding = %config.embedding.provider,
        completion = %config.completion.provider,
        "Session configured"
    );

    Ok(Session::new(retriever, synthesizer))
}
