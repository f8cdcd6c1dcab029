//! Grounded answer generation.
//!
//! Joins retrieved chunks into a context block, renders the grounding prompt
//! and sends it to the completion service.

use crate::types::Chunk;
use docchat_core::{AppResult, CompletionServiceConfig};
use docchat_llm::{LlmClient, LlmRequest};
use docchat_prompt::{build_prompt, grounding_prompt, BuiltPrompt, PromptDefinition};
use std::collections::HashMap;
use std::sync::Arc;

/// Turns retrieved chunks plus a question into an answer.
#[derive(Clone)]
pub struct AnswerSynthesizer {
    client: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl AnswerSynthesizer {
    /// Create a synthesizer using the built-in grounding prompt.
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            prompt: grounding_prompt(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Create a synthesizer with the model and sampling settings from config.
    pub fn from_config(client: Arc<dyn LlmClient>, config: &CompletionServiceConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            ..Self::new(client, config.model.clone())
        }
    }

    /// Replace the grounding prompt.
    pub fn with_prompt(mut self, prompt: PromptDefinition) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Chunk texts in result order, one per line. No dedup, no re-ranking.
    pub fn build_context(chunks: &[&Chunk]) -> String {
        chunks
            .iter()
            .map(|chunk| chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Render the grounding prompt for `question` over `chunks`.
    pub fn render(&self, chunks: &[&Chunk], question: &str) -> AppResult<BuiltPrompt> {
        let mut variables = HashMap::new();
        variables.insert("context".to_string(), Self::build_context(chunks));
        variables.insert("question".to_string(), question.to_string());
        build_prompt(&self.prompt, variables)
    }

    /// Ask the completion service and return its trimmed answer verbatim.
    ///
    /// An empty chunk list still produces a request.
    #[tracing::instrument(skip(self, chunks, question), fields(chunks = chunks.len(), model = %self.model))]
    pub async fn synthesize(&self, chunks: &[&Chunk], question: &str) -> AppResult<String> {
        let built = self.render(chunks, question)?;

        let mut request = LlmRequest::new(built.user, self.model.clone());
        if let Some(system) = built.system {
            request = request.with_system(system);
        }
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        let response = self.client.complete(&request).await?;
        tracing::debug!(
            provider = self.client.provider_name(),
            tokens = response.usage.total_tokens,
            "Answer generated"
        );

        Ok(response.content.trim().to_string())
    }
}

impl std::fmt::Debug for AnswerSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerSynthesizer")
            .field("provider", &self.client.provider_name())
            .field("model", &self.model)
            .field("prompt", &self.prompt.id)
            .finish()
    }
}
