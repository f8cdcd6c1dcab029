//! Interactive chat over documents.
//!
//! Reads questions from stdin line by line. Lines starting with `:` are
//! session commands.

use super::{progress_reporter, upload};
use clap::Args;
use docchat_core::{config::AppConfig, AppError, AppResult};
use docchat_knowledge::{ProgressReporter, Session};
use docchat_prompt::PromptDefinition;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Interactive chat over documents
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Documents or directories to load at start
    #[arg(short, long = "file", num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// Number of chunks to retrieve per question
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,
}

/// One line of chat input.
#[derive(Debug, Clone, PartialEq)]
enum ChatInput {
    Empty,
    Quit,
    History,
    Load(Vec<PathBuf>),
    Unknown(String),
    Question(String),
}

impl ChatInput {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }

        let Some(command) = line.strip_prefix(':') else {
            return Self::Question(line.to_string());
        };

        let mut parts = command.split_whitespace();
        match parts.next().unwrap_or_default() {
            "quit" | "q" | "exit" => Self::Quit,
            "history" => Self::History,
            "load" => Self::Load(parts.map(PathBuf::from).collect()),
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig, prompt: Option<PromptDefinition>) -> AppResult<()> {
        let progress = progress_reporter(false);
        let session = docchat_knowledge::session_from_config(config, prompt, progress.clone())?;
        let k = self.top_k.unwrap_or(config.retrieval.top_k);

        if !self.files.is_empty() {
            let chunks = upload(&session, &self.files, &progress).await?;
            println!("Loaded {} chunks. Ask away, or :quit to leave.", chunks);
        } else {
            println!("No documents loaded. Use :load <path>... to add some.");
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("> ");
            std::io::stdout().flush().ok();

            let Some(line) = lines.next_line().await? else {
                break;
            };

            match ChatInput::parse(&line) {
                ChatInput::Empty => continue,
                ChatInput::Quit => break,
                ChatInput::History => print_history(&session).await,
                ChatInput::Load(paths) => load(&session, &paths, &progress).await,
                ChatInput::Unknown(command) => {
                    eprintln!("Unknown command :{} (try :load, :history or :quit)", command)
                }
                ChatInput::Question(question) => match session.ask(&question, k).await {
                    Ok(answer) => println!("{}", answer),
                    Err(AppError::NoIndex) => {
                        eprintln!("No documents loaded yet. Use :load <path>... first.")
                    }
                    Err(e) => {
                        tracing::warn!("Question failed: {}", e);
                        eprintln!("Error: {}", e);
                    }
                },
            }
        }

        tracing::info!("Chat ended after {} messages", session.transcript().await.len());
        Ok(())
    }
}

async fn load(session: &Session, paths: &[PathBuf], progress: &ProgressReporter) {
    if paths.is_empty() {
        eprintln!("Usage: :load <path>...");
        return;
    }

    match upload(session, paths, progress).await {
        Ok(chunks) => println!("Loaded {} chunks.", chunks),
        Err(e) => {
            let kept = if session.current_index().await.is_some() {
                " Previous documents remain active."
            } else {
                ""
            };
            eprintln!("Load failed: {}.{}", e, kept);
        }
    }
}

async fn print_history(session: &Session) {
    let transcript = session.transcript().await;
    if transcript.is_empty() {
        println!("(no messages yet)");
    }
    for entry in transcript {
        println!("[{}] {}: {}", entry.at.format("%H:%M:%S"), entry.speaker, entry.message);
    }
}
