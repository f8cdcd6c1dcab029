//! docchat CLI
//!
//! Ask questions about PDF, CSV and text documents, answered by a completion
//! model grounded in the most similar document chunks.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ChatCommand, ChunksCommand};
use docchat_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// docchat - chat with your documents
#[derive(Parser, Debug)]
#[command(name = "docchat")]
#[command(about = "Answer questions grounded in your documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Embedding provider (gemini, ollama, mock)
    #[arg(long, global = true)]
    embedding_provider: Option<String>,

    /// Completion provider (gemini, ollama)
    #[arg(long, global = true)]
    completion_provider: Option<String>,

    /// Completion model identifier
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Prompt definition file replacing the built-in grounding prompt
    #[arg(long, global = true)]
    prompt: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer a single question about documents
    Ask(AskCommand),

    /// Interactive chat over documents
    Chat(ChatCommand),

    /// Show how documents are split into chunks
    Chunks(ChunksCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    // File and environment first, flags on top
    let config = AppConfig::load(cli.config)?.with_overrides(
        cli.embedding_provider,
        cli.completion_provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("docchat starting");
    tracing::debug!(
        "Embedding: {} ({}), completion: {} ({})",
        config.embedding.provider,
        config.embedding.model,
        config.completion.provider,
        config.completion.model
    );

    let prompt = cli.prompt.as_deref().map(docchat_prompt::load_prompt).transpose()?;

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Chat(_) => "chat",
        Commands::Chunks(_) => "chunks",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config, prompt).await,
        Commands::Chat(cmd) => cmd.execute(&config, prompt).await,
        Commands::Chunks(cmd) => cmd.execute(&config),
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
