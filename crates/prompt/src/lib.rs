//! Prompt templates for docchat.
//!
//! This crate provides grounding prompt management with:
//! - A built-in default grounding prompt
//! - YAML-based prompt overrides
//! - Handlebars template rendering

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use loader::{grounding_prompt, load_prompt, GROUNDING_PROMPT_ID};
pub use types::{BuiltPrompt, PromptDefinition};
