//! Ask command handler.
//!
//! Builds an index over the given documents and answers one question.

use super::{progress_reporter, upload, with_retrieval_overrides};
use clap::Args;
use docchat_core::{config::AppConfig, AppResult};
use docchat_prompt::PromptDefinition;
use std::path::PathBuf;

/// Answer a single question about documents
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Documents or directories to answer from (.pdf, .csv, .txt, .md)
    #[arg(short, long = "file", required = true, num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// Number of chunks to retrieve
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

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

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig, prompt: Option<PromptDefinition>) -> AppResult<()> {
        tracing::info!("Executing ask command over {} path(s)", self.files.len());

        let config = with_retrieval_overrides(config, self.chunk_size, self.overlap, self.top_k);
        let progress = progress_reporter(self.json);
        let session = docchat_knowledge::session_from_config(&config, prompt, progress.clone())?;

        let chunks = upload(&session, &self.files, &progress).await?;
        let k = config.retrieval.top_k;
        let answer = session.ask(&self.question, k).await?;

        if self.json {
            let output = serde_json::json!({
                "question": self.question,
                "answer": answer,
                "chunksIndexed": chunks,
                "topK": k,
                "provider": config.completion.provider_name(),
                "model": config.completion.model,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", answer);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct Harness {
        #[command(flatten)]
        ask: AskCommand,
    }

    #[test]
    fn test_parse_ask_flags() {
        let parsed = Harness::try_parse_from([
            "docchat", "Who sat?", "--file", "a.txt", "b.pdf", "-k", "5", "--chunk-size", "200",
            "--overlap", "20", "--json",
        ])
        .unwrap();

        assert_eq!(parsed.ask.question, "Who sat?");
        assert_eq!(
            parsed.ask.files,
            vec![PathBuf::from("a.txt"), PathBuf::from("b.pdf")]
        );
        assert_eq!(parsed.ask.top_k, Some(5));
        assert_eq!(parsed.ask.chunk_size, Some(200));
        assert_eq!(parsed.ask.overlap, Some(20));
        assert!(parsed.ask.json);
    }

    #[test]
    fn test_file_required() {
        assert!(Harness::try_parse_from(["docchat", "Who sat?"]).is_err());
    }
}
