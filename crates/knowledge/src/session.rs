//! Chat session state: the active index and the transcript.
//!
//! A session holds at most one index. Uploads are built off to the side and
//! swapped in only when the whole build succeeds, so a failed upload leaves
//! the previous index active. Builds are serialized; questions share the
//! active index read-only.

use crate::flat_index::SimilarityIndex;
use crate::rag::AnswerSynthesizer;
use crate::retriever::Retriever;
use crate::types::{Speaker, TranscriptEntry};
use crate::vector_index::VectorIndex;
use docchat_core::{AppError, AppResult};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Shared, immutable handle to a built index.
pub type IndexHandle = Arc<SimilarityIndex>;

/// One user's conversation over one uploaded document set.
#[derive(Debug)]
pub struct Session {
    retriever: Retriever,
    synthesizer: AnswerSynthesizer,
    index: RwLock<Option<IndexHandle>>,
    build_lock: Mutex<()>,
    transcript: Mutex<Vec<TranscriptEntry>>,
}

impl Session {
    pub fn new(retriever: Retriever, synthesizer: AnswerSynthesizer) -> Self {
        Self {
            retriever,
            synthesizer,
            index: RwLock::new(None),
            build_lock: Mutex::new(()),
            transcript: Mutex::new(Vec::new()),
        }
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Build an index from document text and make it the active one.
    ///
    /// On any error the previously active index stays in place.
    pub async fn process_upload(&self, text: &str) -> AppResult<IndexHandle> {
        let _build = self.build_lock.lock().await;

        let index = Arc::new(self.retriever.build_from_text(text).await?);
        *self.index.write().await = Some(Arc::clone(&index));

        tracing::info!("Session index replaced ({} chunks)", index.len());
        Ok(index)
    }

    /// The active index, if any.
    pub async fn current_index(&self) -> Option<IndexHandle> {
        self.index.read().await.clone()
    }

    /// Answer a question from the active index.
    ///
    /// Returns `AppError::NoIndex` when nothing has been uploaded yet.
    pub async fn ask(&self, question: &str, k: usize) -> AppResult<String> {
        let index = self.current_index().await.ok_or(AppError::NoIndex)?;
        self.ask_with(&index, question, k).await
    }

    /// Answer a question from an explicit index.
    ///
    /// The transcript is appended only when an answer was produced.
    #[tracing::instrument(skip(self, index, question), fields(chunks = index.len()))]
    pub async fn ask_with(&self, index: &SimilarityIndex, question: &str, k: usize) -> AppResult<String> {
        let chunks = self.retriever.retrieve(index, question, k).await?;
        let answer = self.synthesizer.synthesize(&chunks, question).await?;

        let mut transcript = self.transcript.lock().await;
        transcript.push(TranscriptEntry::new(Speaker::User, question));
        transcript.push(TranscriptEntry::new(Speaker::Chatbot, answer.clone()));

        Ok(answer)
    }

    /// Snapshot of the conversation so far.
    pub async fn transcript(&self) -> Vec<TranscriptEntry> {
        self.transcript.lock().await.clone()
    }
}
