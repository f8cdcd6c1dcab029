//! Embedding clients for chunks and questions.
//!
//! Provides provider-agnostic embedding generation. Documents and queries are
//! embedded into one vector space; the mode only tunes the remote task type.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
