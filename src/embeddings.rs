//! Embedding providers.
//!
//! The index and the retriever share one [`EmbeddingProvider`] behind an
//! `Arc`, which is what keeps build-time and query-time vectors in the same
//! embedding space. [`OllamaEmbeddingProvider`] talks to a local Ollama
//! instance; [`MockEmbeddingProvider`] produces deterministic hash-derived
//! vectors for tests.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::EmbeddingConfig;
use crate::types::AssistantError;

/// One fixed-dimension vector per input string, same model every call.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AssistantError>;

    /// Short label for telemetry.
    fn name(&self) -> &str;
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

/// Embeddings via a local Ollama `/api/embeddings` endpoint.
#[derive(Clone)]
pub struct OllamaEmbeddingProvider {
    client: Client,
    endpoint: Url,
    model: String,
}

impl OllamaEmbeddingProvider {
    pub fn new(config: &EmbeddingConfig) -> Result<Self, AssistantError> {
        Self::from_parts(config.endpoint.clone(), &config.model, config.timeout)
    }

    pub fn from_parts(
        endpoint: Url,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, AssistantError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AssistantError::Config(err.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddingProvider {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AssistantError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            let request = EmbedRequest {
                model: &self.model,
                prompt: text,
            };
            let response = self
                .client
                .post(self.endpoint.clone())
                .json(&request)
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(|err| AssistantError::Embedding(err.to_string()))?;
            let body: EmbedResponse = response
                .json()
                .await
                .map_err(|err| AssistantError::Embedding(err.to_string()))?;
            if body.embedding.is_empty() {
                return Err(AssistantError::Embedding(
                    "provider returned an empty vector".to_string(),
                ));
            }
            vectors.push(body.embedding);
        }
        Ok(vectors)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// Deterministic hash-derived embeddings for tests and offline runs.
///
/// Identical text always maps to an identical vector, so self-retrieval
/// returns distance zero; distinct texts land on distinct vectors with
/// overwhelming probability.
#[derive(Debug, Clone)]
pub struct MockEmbeddingProvider {
    dimensions: usize,
}

impl Default for MockEmbeddingProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEmbeddingProvider {
    const DEFAULT_DIMENSIONS: usize = 16;

    #[must_use]
    pub fn new() -> Self {
        Self {
            dimensions: Self::DEFAULT_DIMENSIONS,
        }
    }

    #[must_use]
    pub fn with_dimensions(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn hash_to_vec(&self, text: &str) -> Vec<f32> {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let seed = hasher.finish();
        (0..self.dimensions)
            .map(|i| {
                let bits = seed.rotate_left((i as u32) * 7) ^ ((i as u64) << 24);
                (bits as f32) / (u64::MAX as f32)
            })
            .collect()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AssistantError> {
        Ok(texts.iter().map(|text| self.hash_to_vec(text)).collect())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_embeddings_are_deterministic() {
        let provider = MockEmbeddingProvider::new();
        let inputs = vec![
            "Hello world".to_string(),
            "Goodbye world".to_string(),
            "Hello world".to_string(),
        ];

        let first = provider.embed_batch(&inputs).await.unwrap();
        let second = provider.embed_batch(&inputs).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first[0], first[2], "identical text, identical vector");
        assert_ne!(first[0], first[1], "distinct text, distinct vector");
    }

    #[tokio::test]
    async fn mock_default_produces_usable_vectors() {
        let vectors = MockEmbeddingProvider::default()
            .embed_batch(&["a".to_string()])
            .await
            .unwrap();
        assert_eq!(vectors[0].len(), MockEmbeddingProvider::DEFAULT_DIMENSIONS);
    }

    #[tokio::test]
    async fn mock_dimensions_are_fixed() {
        let provider = MockEmbeddingProvider::with_dimensions(8);
        let vectors = provider
            .embed_batch(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert!(vectors.iter().all(|v| v.len() == 8));
    }
}
