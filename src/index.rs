//! In-memory embedding index with exact nearest-neighbour search.
//!
//! The index is built exactly once per knowledge base and never mutated;
//! share it behind an `Arc`. Distances are squared Euclidean, the same
//! metric at build and query time.

use crate::embeddings::EmbeddingProvider;
use crate::ingestion::Passage;
use crate::types::AssistantError;

/// Immutable collection of passages plus their embedding vectors.
///
/// Invariants: every vector has the same dimension, `vectors.len() ==
/// passages.len()`, and [`EmbeddingIndex::search`] only returns positions
/// in `[0, len)`.
pub struct EmbeddingIndex {
    passages: Vec<Passage>,
    vectors: Vec<Vec<f32>>,
    dimensions: usize,
}

impl EmbeddingIndex {
    /// Embeds every passage and assembles the search structure.
    ///
    /// Fails with [`AssistantError::EmptyKnowledgeBase`] on an empty input
    /// set and with [`AssistantError::EmbeddingMismatch`] if the provider
    /// returns vectors of differing dimension.
    pub async fn build(
        passages: Vec<Passage>,
        provider: &dyn EmbeddingProvider,
    ) -> Result<Self, AssistantError> {
        if passages.is_empty() {
            return Err(AssistantError::EmptyKnowledgeBase);
        }

        let texts: Vec<String> = passages.iter().map(|p| p.content.clone()).collect();
        let vectors = provider.embed_batch(&texts).await?;
        if vectors.len() != passages.len() {
            return Err(AssistantError::Embedding(format!(
                "provider returned {} vectors for {} passages",
                vectors.len(),
                passages.len()
            )));
        }

        let dimensions = vectors[0].len();
        if dimensions == 0 {
            return Err(AssistantError::Embedding(
                "provider returned zero-dimensional vectors".to_string(),
            ));
        }
        for vector in &vectors {
            if vector.len() != dimensions {
                return Err(AssistantError::EmbeddingMismatch {
                    expected: dimensions,
                    actual: vector.len(),
                });
            }
        }

        tracing::info!(
            passages = passages.len(),
            dimensions,
            embedder = provider.name(),
            "embedding index built"
        );

        Ok(Self {
            passages,
            vectors,
            dimensions,
        })
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn passage(&self, position: usize) -> Option<&Passage> {
        self.passages.get(position)
    }

    /// Returns up to `k` `(position, squared L2 distance)` pairs, ascending
    /// by distance. Asking for more results than the index holds returns
    /// everything; searching an empty index is an [`AssistantError::EmptyIndex`].
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>, AssistantError> {
        if self.vectors.is_empty() {
            return Err(AssistantError::EmptyIndex);
        }
        if query.len() != self.dimensions {
            return Err(AssistantError::EmbeddingMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, vector)| (position, squared_l2(query, vector)))
            .collect();
        scored.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        scored.truncate(k);
        Ok(scored)
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::MockEmbeddingProvider;
    use uuid::Uuid;

    fn passage(content: &str) -> Passage {
        Passage {
            id: Uuid::new_v4(),
            source: "test.md".to_string(),
            content: content.to_string(),
        }
    }

    async fn sample_index() -> EmbeddingIndex {
        let provider = MockEmbeddingProvider::new();
        let passages = vec![
            passage("PIM centralises product content."),
            passage("MDM keeps one golden record per entity."),
            passage("Attributes describe products in structured fields."),
        ];
        EmbeddingIndex::build(passages, &provider).await.unwrap()
    }

    #[tokio::test]
    async fn empty_passage_set_is_rejected_before_construction() {
        let provider = MockEmbeddingProvider::new();
        let result = EmbeddingIndex::build(Vec::new(), &provider).await;
        assert!(matches!(result, Err(AssistantError::EmptyKnowledgeBase)));
    }

    #[tokio::test]
    async fn self_retrieval_returns_own_position_at_distance_zero() {
        let provider = MockEmbeddingProvider::new();
        let index = sample_index().await;

        for position in 0..index.len() {
            let text = index.passage(position).unwrap().content.clone();
            let query = provider.embed_batch(&[text]).await.unwrap().remove(0);
            let hits = index.search(&query, 1).unwrap();
            assert_eq!(hits[0].0, position);
            assert!(hits[0].1.abs() < f32::EPSILON);
        }
    }

    #[tokio::test]
    async fn results_are_ascending_and_bounded_by_k() {
        let provider = MockEmbeddingProvider::new();
        let index = sample_index().await;
        let query = provider
            .embed_batch(&["product data".to_string()])
            .await
            .unwrap()
            .remove(0);

        let hits = index.search(&query, 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].1 <= hits[1].1);
        assert!(hits.iter().all(|(position, _)| *position < index.len()));
    }

    #[tokio::test]
    async fn oversized_k_returns_all_without_error() {
        let provider = MockEmbeddingProvider::new();
        let index = sample_index().await;
        let query = provider
            .embed_batch(&["anything".to_string()])
            .await
            .unwrap()
            .remove(0);

        let hits = index.search(&query, 50).unwrap();
        assert_eq!(hits.len(), index.len());
    }

    #[tokio::test]
    async fn dimension_mismatch_is_reported() {
        let index = sample_index().await;
        let result = index.search(&[0.0_f32; 3], 1);
        assert!(matches!(
            result,
            Err(AssistantError::EmbeddingMismatch { expected: 16, actual: 3 })
        ));
    }
}
