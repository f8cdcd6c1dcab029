//! Retrieval pipeline type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// A contiguous segment of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Integer identifier, the chunk's dense position in its document set
    pub id: u64,

    /// Chunk text, an exact slice of the source document
    pub text: String,

    /// Position of the chunk within the document (0-indexed)
    pub source_order: usize,

    /// Byte range of `text` in the source document
    pub byte_range: Range<usize>,
}

impl Chunk {
    /// Character count of the chunk text.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// A fixed-dimension embedding vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingVector {
    pub values: Vec<f32>,
}

impl EmbeddingVector {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Number of components.
    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }
}

impl From<Vec<f32>> for EmbeddingVector {
    fn from(values: Vec<f32>) -> Self {
        Self::new(values)
    }
}

/// Whether a text is embedded for storage or for searching.
///
/// Both modes produce vectors in the same space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingMode {
    Document,
    Query,
}

impl EmbeddingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Query => "query",
        }
    }
}

/// Author of a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    #[serde(rename = "You")]
    User,
    #[serde(rename = "Chatbot")]
    Chatbot,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "You"),
            Self::Chatbot => write!(f, "Chatbot"),
        }
    }
}

/// One message in a session transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl TranscriptEntry {
    pub fn new(speaker: Speaker, message: impl Into<String>) -> Self {
        Self {
            speaker,
            message: message.into(),
            at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speaker_labels() {
        assert_eq!(Speaker::User.to_string(), "You");
        assert_eq!(Speaker::Chatbot.to_string(), "Chatbot");
        assert_eq!(serde_json::to_string(&Speaker::User).unwrap(), "\"You\"");
    }

    #[test]
    fn test_chunk_serialization_keeps_byte_range() {
        let chunk = Chunk {
            id: 2,
            text: "héllo".to_string(),
            source_order: 2,
            byte_range: 4..10,
        };

        let json = serde_json::to_value(&chunk).unwrap();
        assert_eq!(json["byte_range"]["start"], 4);
        assert_eq!(json["byte_range"]["end"], 10);
        assert_eq!(chunk.char_count(), 5);
    }

    #[test]
    fn test_embedding_vector_dimension() {
        let vector = EmbeddingVector::from(vec![0.5, 0.25, 0.0]);
        assert_eq!(vector.dimension(), 3);
        assert_eq!(vector.as_slice(), &[0.5, 0.25, 0.0]);
    }
}
