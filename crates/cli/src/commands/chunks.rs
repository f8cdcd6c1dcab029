//! Chunks command handler: preview how documents are split.

use super::with_retrieval_overrides;
use clap::Args;
use docchat_core::{config::AppConfig, AppResult};
use docchat_knowledge::{parser, ChunkConfig, ProgressReporter, TextChunker};
use std::path::PathBuf;

/// Show how documents are split into chunks
#[derive(Args, Debug)]
pub struct ChunksCommand {
    /// Documents or directories to split
    #[arg(short, long = "file", required = true, num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// Maximum characters per chunk
    #[arg(long, allow_negative_numbers = true)]
    pub chunk_size: Option<i64>,

    /// Characters shared between consecutive chunks
    #[arg(long, allow_negative_numbers = true)]
    pub overlap: Option<i64>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ChunksCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let config = with_retrieval_overrides(config, self.chunk_size, self.overlap, None);
        let chunker = TextChunker::new(ChunkConfig::from_retrieval(&config.retrieval)?);

        let text = parser::load_documents(&self.files, &ProgressReporter::noop())?;
        let chunks = chunker.split(&text);
        tracing::info!("Split {} bytes into {} chunks", text.len(), chunks.len());

        if self.json {
            println!("{}", serde_json::to_string_pretty(&chunks)?);
            return Ok(());
        }

        for chunk in &chunks {
            println!(
                "--- chunk {} ({} chars, bytes {}..{}) ---",
                chunk.source_order,
                chunk.char_count(),
                chunk.byte_range.start,
                chunk.byte_range.end
            );
            println!("{}", chunk.text);
        }
        println!("{} chunks", chunks.len());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docchat_core::AppError;
    use tempfile::TempDir;

    #[test]
    fn test_invalid_overlap_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "some text").unwrap();

        let cmd = ChunksCommand {
            files: vec![path],
            chunk_size: Some(10),
            overlap: Some(10),
            json: false,
        };
        assert!(matches!(cmd.execute(&AppConfig::default()), Err(AppError::Config(_))));
    }

    #[test]
    fn test_chunks_plain_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "A cat sat.\nA dog ran.").unwrap();

        let cmd = ChunksCommand {
            files: vec![path],
            chunk_size: Some(12),
            overlap: Some(0),
            json: true,
        };
        assert!(cmd.execute(&AppConfig::default()).is_ok());
    }
}
