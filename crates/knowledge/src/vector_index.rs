//! Vector index abstraction for document chunks.

use crate::types::{Chunk, EmbeddingVector};
use docchat_core::AppResult;

/// A search result: chunk plus squared L2 distance to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit<'a> {
    pub chunk: &'a Chunk,
    pub position: usize,
    pub distance: f32,
}

/// Trait for nearest-neighbour search over embedded chunks.
///
/// Implementations must return hits by ascending distance, ties broken by
/// lower insertion position, and at most `k` of them.
pub trait VectorIndex: Send + Sync {
    /// Number of indexed chunks.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shared vector dimension, `None` for an empty index.
    fn dimension(&self) -> Option<usize>;

    /// Search for the `k` nearest chunks, exposing distances.
    fn search_with_distances(&self, query: &EmbeddingVector, k: usize) -> AppResult<Vec<SearchHit<'_>>>;

    /// Search for the `k` nearest chunks, best first.
    fn search(&self, query: &EmbeddingVector, k: usize) -> AppResult<Vec<&Chunk>> {
        Ok(self
            .search_with_distances(query, k)?
            .into_iter()
            .map(|hit| hit.chunk)
            .collect())
    }
}
