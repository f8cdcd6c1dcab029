//! Index construction and question-time retrieval.
//!
//! Building turns document text into a [`SimilarityIndex`]: chunk, embed
//! every chunk in document mode, then build the index in one step. Retrieval
//! embeds the question in query mode and searches the index.

use crate::chunker::{ChunkConfig, TextChunker};
use crate::embeddings::EmbeddingProvider;
use crate::flat_index::SimilarityIndex;
use crate::progress::ProgressReporter;
use crate::types::{Chunk, EmbeddingVector};
use crate::vector_index::VectorIndex;
use docchat_core::{AppError, AppResult, RetrievalConfig};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Chunks retrieved per question unless the caller asks otherwise.
///
/// Deliberately large: recall matters more than precision here.
pub const DEFAULT_TOP_K: usize = 30;

/// Builds indexes and answers nearest-chunk queries against them.
#[derive(Debug, Clone)]
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    config: RetrievalConfig,
    progress: ProgressReporter,
}

impl Retriever {
    /// Create a retriever. Chunking parameters are validated on each build.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, config: RetrievalConfig) -> Self {
        Self {
            embedder,
            config,
            progress: ProgressReporter::noop(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    /// Chunk, embed and index `text`.
    ///
    /// Invalid chunking parameters fail before any embedding call. Any
    /// embedding failure aborts the whole build.
    #[tracing::instrument(skip(self, text), fields(text_len = text.len(), provider = self.embedder.provider_name()))]
    pub async fn build_from_text(&self, text: &str) -> AppResult<SimilarityIndex> {
        let start = Instant::now();
        let chunker = TextChunker::new(ChunkConfig::from_retrieval(&self.config)?);

        if self.config.embed_concurrency == 0 {
            return Err(AppError::Config(
                "embedConcurrency must be greater than zero".to_string(),
            ));
        }

        let chunks = chunker.split(text);
        self.progress.chunk(chunks.len() as u64);

        let vectors = self.embed_chunks(&chunks).await?;

        self.progress.index(vectors.len() as u64);
        let index = SimilarityIndex::build(chunks, vectors)?;

        tracing::info!(
            "Built index: {} chunks, dimension {:?} in {:.2}s",
            index.len(),
            index.dimension(),
            start.elapsed().as_secs_f64()
        );

        Ok(index)
    }

    /// Embed chunks with bounded concurrency, keeping chunk order.
    async fn embed_chunks(&self, chunks: &[Chunk]) -> AppResult<Vec<EmbeddingVector>> {
        let total = chunks.len() as u64;
        let done = AtomicU64::new(0);
        let done = &done;

        stream::iter(chunks)
            .map(|chunk| async move {
                let vector = self.embedder.embed_document(&chunk.text).await?;
                let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                self.progress.embed(finished, total, self.embedder.model_name());
                Ok::<_, AppError>(vector)
            })
            .buffered(self.config.embed_concurrency)
            .try_collect()
            .await
    }

    /// Retrieve the `k` chunks closest to `query`, best first.
    #[tracing::instrument(skip(self, index, query))]
    pub async fn retrieve<'a>(
        &self,
        index: &'a dyn VectorIndex,
        query: &str,
        k: usize,
    ) -> AppResult<Vec<&'a Chunk>> {
        let query_vector = self.embedder.embed_query(query).await?;
        let chunks = index.search(&query_vector, k)?;

        tracing::debug!("Retrieved {} of {} chunks", chunks.len(), index.len());
        Ok(chunks)
    }
}
