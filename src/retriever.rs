//! Top-k passage retrieval for a natural-language query.

use std::sync::Arc;

use crate::embeddings::EmbeddingProvider;
use crate::index::EmbeddingIndex;
use crate::types::AssistantError;

/// Separates retrieved passages in the composed context string.
pub const PASSAGE_DELIMITER: &str = "\n\n---\n\n";

/// Embeds queries with the index's own provider and maps search hits back
/// to passage text.
#[derive(Clone)]
pub struct Retriever {
    index: Arc<EmbeddingIndex>,
    provider: Arc<dyn EmbeddingProvider>,
}

impl Retriever {
    /// The provider must be the same one the index was built with;
    /// mixing embedding models breaks similarity.
    pub fn new(index: Arc<EmbeddingIndex>, provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { index, provider }
    }

    pub fn index(&self) -> &EmbeddingIndex {
        &self.index
    }

    /// Returns the top-k passages joined in ranked order.
    ///
    /// `k` greater than the index size returns every passage; the result is
    /// never empty for a successfully built index.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<String, AssistantError> {
        let mut embedded = self.provider.embed_batch(&[query.to_string()]).await?;
        let query_vector = if embedded.is_empty() {
            return Err(AssistantError::Embedding(
                "provider returned no vector for the query".to_string(),
            ));
        } else {
            embedded.remove(0)
        };

        let hits = self.index.search(&query_vector, k)?;
        tracing::debug!(query_len = query.len(), hits = hits.len(), "retrieved context");

        let texts: Vec<&str> = hits
            .iter()
            .filter_map(|(position, _)| self.index.passage(*position))
            .map(|passage| passage.content.as_str())
            .collect();
        Ok(texts.join(PASSAGE_DELIMITER))
    }
}
