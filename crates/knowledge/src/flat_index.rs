//! Exact in-memory similarity index.
//!
//! Vectors are stored in one contiguous buffer alongside a parallel chunk
//! list. Search is brute force over squared L2 distance.

use crate::types::{Chunk, EmbeddingVector};
use crate::vector_index::{SearchHit, VectorIndex};
use docchat_core::{AppError, AppResult};

/// Flat L2 index over the chunks of one document set.
#[derive(Debug, Clone, Default)]
pub struct SimilarityIndex {
    chunks: Vec<Chunk>,
    vectors: Vec<f32>,
    dimension: usize,
}

impl SimilarityIndex {
    /// Build an index from chunks and their vectors, matched by position.
    ///
    /// The first vector fixes the dimension. Empty input yields a valid
    /// empty index. Vectors with NaN or infinite components are rejected as
    /// malformed embeddings.
    pub fn build(chunks: Vec<Chunk>, vectors: Vec<EmbeddingVector>) -> AppResult<Self> {
        if chunks.len() != vectors.len() {
            return Err(AppError::DimensionMismatch(format!(
                "{} chunks but {} vectors",
                chunks.len(),
                vectors.len()
            )));
        }

        let dimension = vectors.first().map(|v| v.dimension()).unwrap_or(0);
        if !vectors.is_empty() && dimension == 0 {
            return Err(AppError::DimensionMismatch(
                "vectors must have at least one component".to_string(),
            ));
        }

        let mut flat = Vec::with_capacity(dimension * vectors.len());
        for (position, vector) in vectors.iter().enumerate() {
            if vector.dimension() != dimension {
                return Err(AppError::DimensionMismatch(format!(
                    "vector {} has dimension {}, expected {}",
                    position,
                    vector.dimension(),
                    dimension
                )));
            }
            ensure_finite(vector, &format!("vector {}", position))?;
            flat.extend_from_slice(vector.as_slice());
        }

        tracing::debug!(
            "Built similarity index with {} vectors of dimension {}",
            chunks.len(),
            dimension
        );

        Ok(Self {
            chunks,
            vectors: flat,
            dimension,
        })
    }

    /// Indexed chunks in insertion order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn chunk(&self, position: usize) -> Option<&Chunk> {
        self.chunks.get(position)
    }

    fn vector(&self, position: usize) -> &[f32] {
        let start = position * self.dimension;
        &self.vectors[start..start + self.dimension]
    }
}

impl VectorIndex for SimilarityIndex {
    fn len(&self) -> usize {
        self.chunks.len()
    }

    fn dimension(&self) -> Option<usize> {
        (!self.chunks.is_empty()).then_some(self.dimension)
    }

    fn search_with_distances(&self, query: &EmbeddingVector, k: usize) -> AppResult<Vec<SearchHit<'_>>> {
        if self.chunks.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        if query.dimension() != self.dimension {
            return Err(AppError::DimensionMismatch(format!(
                "query has dimension {}, index has {}",
                query.dimension(),
                self.dimension
            )));
        }
        ensure_finite(query, "query vector")?;

        let mut hits: Vec<SearchHit<'_>> = self
            .chunks
            .iter()
            .enumerate()
            .map(|(position, chunk)| SearchHit {
                chunk,
                position,
                distance: squared_l2(query.as_slice(), self.vector(position)),
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.position.cmp(&b.position))
        });
        hits.truncate(k);

        Ok(hits)
    }
}

fn ensure_finite(vector: &EmbeddingVector, what: &str) -> AppResult<()> {
    match vector.as_slice().iter().position(|v| !v.is_finite()) {
        Some(i) => Err(AppError::EmbeddingService(format!(
            "{} has a non-finite component at {}",
            what, i
        ))),
        None => Ok(()),
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str, source_order: usize) -> Chunk {
        Chunk {
            id: source_order as u64,
            text: text.to_string(),
            source_order,
            byte_range: 0..text.len(),
        }
    }

    fn vectors(values: &[&[f32]]) -> Vec<EmbeddingVector> {
        values.iter().map(|v| EmbeddingVector::new(v.to_vec())).collect()
    }

    fn query(values: &[f32]) -> EmbeddingVector {
        EmbeddingVector::new(values.to_vec())
    }

    #[test]
    fn test_count_mismatch() {
        let result = SimilarityIndex::build(vec![chunk("a", 0)], vec![]);
        assert!(matches!(result, Err(AppError::DimensionMismatch(_))));
    }

    #[test]
    fn test_dimension_mismatch() {
        let result = SimilarityIndex::build(
            vec![chunk("a", 0), chunk("b", 1)],
            vectors(&[&[1.0, 0.0], &[1.0, 0.0, 0.0]]),
        );
        assert!(matches!(result, Err(AppError::DimensionMismatch(_))));
    }

    #[test]
    fn test_empty_index() {
        let index = SimilarityIndex::build(vec![], vec![]).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.dimension(), None);
        assert!(index.search(&query(&[1.0, 2.0, 3.0]), 5).unwrap().is_empty());
    }

    #[test]
    fn test_results_ordered_and_capped() {
        let index = SimilarityIndex::build(
            vec![chunk("far", 0), chunk("near", 1), chunk("mid", 2)],
            vectors(&[&[10.0, 10.0], &[1.0, 1.0], &[3.0, 3.0]]),
        )
        .unwrap();

        let hits = index.search_with_distances(&query(&[1.0, 1.0]), 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].chunk.text, "near");
        assert_eq!(hits[0].distance, 0.0);
        assert_eq!(hits[1].chunk.text, "mid");
        assert_eq!(hits[1].distance, 8.0);

        let all = index.search(&query(&[1.0, 1.0]), 30).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].text, "far");
    }

    #[test]
    fn test_ties_broken_by_insertion_order() {
        let index = SimilarityIndex::build(
            vec![chunk("first", 0), chunk("second", 1), chunk("third", 2)],
            vectors(&[&[0.0, 1.0], &[1.0, 0.0], &[0.0, 1.0]]),
        )
        .unwrap();

        let hits = index.search_with_distances(&query(&[0.0, 0.0]), 3).unwrap();
        let positions: Vec<usize> = hits.iter().map(|h| h.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn test_source_order_does_not_affect_ranking() {
        let index = SimilarityIndex::build(
            vec![chunk("late", 9), chunk("early", 0)],
            vectors(&[&[0.0], &[5.0]]),
        )
        .unwrap();

        let results = index.search(&query(&[0.0]), 2).unwrap();
        assert_eq!(results[0].text, "late");
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let index =
            SimilarityIndex::build(vec![chunk("a", 0)], vectors(&[&[1.0, 0.0]])).unwrap();
        let result = index.search(&query(&[1.0]), 1);
        assert!(matches!(result, Err(AppError::DimensionMismatch(_))));
    }

    #[test]
    fn test_non_finite_vectors_rejected() {
        let chunks: Vec<Chunk> = (0..64).map(|i| chunk("c", i)).collect();
        let values: Vec<EmbeddingVector> = (0..64)
            .map(|i| query(&[if i % 3 == 0 { f32::NAN } else { i as f32 }]))
            .collect();
        let result = SimilarityIndex::build(chunks, values);
        assert!(matches!(result, Err(AppError::EmbeddingService(_))));

        let result = SimilarityIndex::build(vec![chunk("a", 0)], vectors(&[&[f32::INFINITY]]));
        assert!(matches!(result, Err(AppError::EmbeddingService(_))));
    }

    #[test]
    fn test_non_finite_query_rejected() {
        let index =
            SimilarityIndex::build(vec![chunk("a", 0)], vectors(&[&[1.0]])).unwrap();
        let result = index.search(&query(&[f32::NAN]), 1);
        assert!(matches!(result, Err(AppError::EmbeddingService(_))));
    }

    #[test]
    fn test_overflowing_distances_still_ordered() {
        let index = SimilarityIndex::build(
            (0..40).map(|i| chunk("c", i)).collect(),
            (0..40)
                .map(|i| query(&[if i % 2 == 0 { f32::MAX } else { i as f32 }]))
                .collect(),
        )
        .unwrap();

        let hits = index.search_with_distances(&query(&[0.0]), 40).unwrap();
        assert_eq!(hits.len(), 40);
        assert_eq!(hits[0].position, 1);
        assert_eq!(hits[20].position, 0);
        assert!(hits[20].distance.is_infinite());
        for pair in hits.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
    }

    #[test]
    fn test_k_zero() {
        let index =
            SimilarityIndex::build(vec![chunk("a", 0)], vectors(&[&[1.0]])).unwrap();
        assert!(index.search(&query(&[1.0]), 0).unwrap().is_empty());
    }
}
