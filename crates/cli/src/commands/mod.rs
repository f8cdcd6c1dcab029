//! Command handlers for the docchat CLI.

pub mod ask;
pub mod chat;
pub mod chunks;

pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use chunks::ChunksCommand;

use docchat_core::{config::AppConfig, AppResult};
use docchat_knowledge::{parser, ProgressEvent, ProgressReporter, Session};
use std::path::PathBuf;
use std::sync::Arc;

/// Copy of `config` with per-command retrieval flags applied.
pub fn with_retrieval_overrides(
    config: &AppConfig,
    chunk_size: Option<i64>,
    chunk_overlap: Option<i64>,
    top_k: Option<usize>,
) -> AppConfig {
    let mut config = config.clone();
    if let Some(chunk_size) = chunk_size {
        config.retrieval.chunk_size = chunk_size;
    }
    if let Some(chunk_overlap) = chunk_overlap {
        config.retrieval.chunk_overlap = chunk_overlap;
    }
    if let Some(top_k) = top_k {
        config.retrieval.top_k = top_k;
    }
    config
}

/// Progress reporter writing to stderr, or only to the log when `quiet`.
pub fn progress_reporter(quiet: bool) -> ProgressReporter {
    if quiet {
        return ProgressReporter::noop();
    }

    ProgressReporter::new(Arc::new(|event: ProgressEvent| {
        eprintln!("{}", event.format_simple());
    }))
}

/// Extract `files` and make them the session's active index.
///
/// Returns the number of chunks indexed.
pub async fn upload(
    session: &Session,
    files: &[PathBuf],
    progress: &ProgressReporter,
) -> AppResult<usize> {
    let text = parser::load_documents(files, progress)?;
    let index = session.process_upload(&text).await?;
    Ok(index.chunks().len())
}
