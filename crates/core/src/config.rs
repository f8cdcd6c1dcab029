//! Configuration management for docchat.
//!
//! Configuration is layered, later sources winning:
//! - Built-in defaults
//! - A YAML config file (`--config`, `DOCCHAT_CONFIG`, or `./docchat.yaml`)
//! - Environment variables
//! - Command-line flags

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Config file picked up from the working directory when nothing else is given.
pub const DEFAULT_CONFIG_FILE: &str = "docchat.yaml";

/// Embedding providers understood by the knowledge crate.
pub const EMBEDDING_PROVIDERS: [&str; 3] = ["gemini", "ollama", "mock"];

/// Completion providers understood by the llm crate.
pub const COMPLETION_PROVIDERS: [&str; 2] = ["gemini", "ollama"];

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Config file the values were read from, if any
    pub config_file: Option<PathBuf>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Embedding service settings
    pub embedding: EmbeddingServiceConfig,

    /// Completion service settings
    pub completion: CompletionServiceConfig,

    /// Chunking and retrieval settings
    pub retrieval: RetrievalConfig,
}

/// Embedding service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmbeddingServiceConfig {
    /// Provider name: "gemini", "ollama" or "mock"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Base URL override
    pub endpoint: Option<String>,

    /// Environment variable holding the API key
    pub api_key_env: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Explicit retry budget per request (0 disables retries)
    pub max_retries: u32,
}

impl Default for EmbeddingServiceConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "models/embedding-001".to_string(),
            endpoint: None,
            api_key_env: Some("GEMINI_API_KEY".to_string()),
            timeout_secs: 30,
            max_retries: 0,
        }
    }
}

impl EmbeddingServiceConfig {
    /// Resolve the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        resolve_api_key(self.api_key_env.as_deref())
    }

    /// Canonical provider name, compared case-insensitively everywhere.
    pub fn provider_name(&self) -> String {
        normalize_provider(&self.provider)
    }
}

/// Completion service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompletionServiceConfig {
    /// Provider name: "gemini" or "ollama"
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Base URL override
    pub endpoint: Option<String>,

    /// Environment variable holding the API key
    pub api_key_env: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Sampling temperature
    pub temperature: Option<f32>,

    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
}

impl Default for CompletionServiceConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-1.5-flash".to_string(),
            endpoint: None,
            api_key_env: Some("GEMINI_API_KEY".to_string()),
            timeout_secs: 60,
            temperature: None,
            max_tokens: None,
        }
    }
}

impl CompletionServiceConfig {
    /// Resolve the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        resolve_api_key(self.api_key_env.as_deref())
    }

    /// Canonical provider name, compared case-insensitively everywhere.
    pub fn provider_name(&self) -> String {
        normalize_provider(&self.provider)
    }
}

/// Chunking and retrieval configuration.
///
/// Chunk sizes are kept signed so that a negative value in a config file is
/// reported as a configuration error instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetrievalConfig {
    /// Maximum chunk length in characters
    pub chunk_size: i64,

    /// Characters repeated between consecutive chunks
    pub chunk_overlap: i64,

    /// Number of chunks retrieved per question
    pub top_k: usize,

    /// Maximum embedding requests in flight during an index build
    pub embed_concurrency: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 100,
            top_k: 30,
            embed_concurrency: 4,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    embedding: Option<EmbeddingServiceConfig>,
    completion: Option<CompletionServiceConfig>,
    retrieval: Option<RetrievalConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl AppConfig {
    /// Load configuration from the config file and environment variables.
    ///
    /// `config_file` is the explicit `--config` path; without it `DOCCHAT_CONFIG`
    /// is consulted, then `./docchat.yaml`. An explicit path that does not
    /// exist is an error; the implicit default is optional.
    ///
    /// Environment variables:
    /// - `DOCCHAT_CONFIG`: Path to config file
    /// - `DOCCHAT_EMBEDDING_PROVIDER`: Embedding provider
    /// - `DOCCHAT_COMPLETION_PROVIDER`: Completion provider
    /// - `DOCCHAT_COMPLETION_MODEL`: Completion model
    /// - `DOCCHAT_CHUNK_SIZE`, `DOCCHAT_CHUNK_OVERLAP`, `DOCCHAT_TOP_K`: Retrieval tuning
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load(config_file: Option<PathBuf>) -> AppResult<Self> {
        let explicit = config_file.or_else(|| std::env::var("DOCCHAT_CONFIG").ok().map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Config file does not exist: {:?}",
                        path
                    )));
                }
                Self::from_file(&path)?
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env()?;
        Ok(config)
    }

    /// Read a YAML config file on top of the defaults.
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut config = Self {
            config_file: Some(path.to_path_buf()),
            ..Self::default()
        };

        if let Some(embedding) = file.embedding {
            config.embedding = embedding;
        }
        if let Some(completion) = file.completion {
            config.completion = completion;
        }
        if let Some(retrieval) = file.retrieval {
            config.retrieval = retrieval;
        }
        if let Some(logging) = file.logging {
            config.log_level = logging.level;
            if let Some(color) = logging.color {
                config.no_color = !color;
            }
        }

        tracing::debug!("Loaded config file {:?}", path);
        Ok(config)
    }

    fn apply_env(&mut self) -> AppResult<()> {
        if let Ok(provider) = std::env::var("DOCCHAT_EMBEDDING_PROVIDER") {
            self.embedding.provider = provider;
        }

        if let Ok(provider) = std::env::var("DOCCHAT_COMPLETION_PROVIDER") {
            self.completion.provider = provider;
        }

        if let Ok(model) = std::env::var("DOCCHAT_COMPLETION_MODEL") {
            self.completion.model = model;
        }

        if let Some(size) = env_number::<i64>("DOCCHAT_CHUNK_SIZE")? {
            self.retrieval.chunk_size = size;
        }

        if let Some(overlap) = env_number::<i64>("DOCCHAT_CHUNK_OVERLAP")? {
            self.retrieval.chunk_overlap = overlap;
        }

        if let Some(top_k) = env_number::<usize>("DOCCHAT_TOP_K")? {
            self.retrieval.top_k = top_k;
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            self.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            self.no_color = true;
        }

        Ok(())
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Flags take precedence over both the config file and the environment.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        embedding_provider: Option<String>,
        completion_provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(provider) = embedding_provider {
            self.embedding.provider = provider;
        }

        if let Some(provider) = completion_provider {
            self.completion.provider = provider;
        }

        if let Some(model) = model {
            self.completion.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Validate provider names, timeouts and concurrency.
    ///
    /// Chunk size and overlap are validated by the chunker itself, right before
    /// any document is split.
    pub fn validate(&self) -> AppResult<()> {
        if !EMBEDDING_PROVIDERS.contains(&self.embedding.provider_name().as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        if !COMPLETION_PROVIDERS.contains(&self.completion.provider_name().as_str()) {
            return Err(AppError::Config(format!(
                "Unknown completion provider: {}. Supported: {}",
                self.completion.provider,
                COMPLETION_PROVIDERS.join(", ")
            )));
        }

        if self.embedding.timeout_secs == 0 || self.completion.timeout_secs == 0 {
            return Err(AppError::Config(
                "Service timeouts must be at least one second".to_string(),
            ));
        }

        if self.retrieval.embed_concurrency == 0 {
            return Err(AppError::Config(
                "embedConcurrency must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

fn normalize_provider(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

fn resolve_api_key(env_var: Option<&str>) -> Option<String> {
    env_var
        .and_then(|name| std::env::var(name).ok())
        .filter(|key| !key.trim().is_empty())
}

fn env_number<T: std::str::FromStr>(name: &str) -> AppResult<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| AppError::Config(format!("{} must be a number, got '{}'", name, raw))),
        Err(_) => Ok(None),
    }
}
