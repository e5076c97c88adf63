//! Shared error types for the assistant pipeline.

use thiserror::Error;

/// Errors surfaced by the retrieval and profiling pipeline.
///
/// Only [`AssistantError::EmptyKnowledgeBase`] and
/// [`AssistantError::EmptyIndex`] are fatal: they block startup. Everything
/// else is caught at a component boundary and converted to a displayable
/// message or a state reset. Generation failures have their own type,
/// [`crate::generation::GenerationError`], because they must resolve to
/// user-visible answer text rather than propagate.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// No passages could be produced from any configured source.
    #[error("knowledge base is empty: no passages could be loaded")]
    EmptyKnowledgeBase,

    /// A similarity search was attempted against an index with no passages.
    #[error("embedding index is empty")]
    EmptyIndex,

    /// The embedding provider failed or returned an unusable payload.
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// A vector did not match the index's fixed dimension.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    EmbeddingMismatch { expected: usize, actual: usize },

    /// An uploaded tabular file could not be parsed.
    #[error("failed to parse uploaded file: {0}")]
    FileParse(String),

    /// Configuration rejected during validation.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
