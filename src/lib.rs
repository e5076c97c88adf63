//! Retrieval-augmented assistant for PIM/MDM questions.
//!
//! ```text
//! knowledge files ──► ingestion::load_passages ──► Vec<Passage>
//!                                   │
//!                                   ▼
//!            index::EmbeddingIndex::build (one vector per passage)
//!                                   │
//! query ──► router::QueryRouter ────┤
//!             │        │            ▼
//!             │        └──► retriever::Retriever (top-k context)
//!             │
//!             ├─ greeting ──────► canned reply
//!             ├─ data question ─► profile report + context prompt
//!             └─ general ──────► domain-restricted prompt
//!                                   │
//!                                   ▼
//!                  generation::OllamaGenerator ──► answer text
//! ```
//!
//! The index is built once at startup and shared read-only; per-session
//! state (uploaded dataset, its profile) lives in [`router::SessionState`]
//! and is threaded through explicitly.

pub mod app;
pub mod config;
pub mod embeddings;
pub mod generation;
pub mod index;
pub mod ingestion;
pub mod profile;
pub mod retriever;
pub mod router;
pub mod types;

pub use app::Assistant;
pub use config::AssistantConfig;
pub use embeddings::{EmbeddingProvider, MockEmbeddingProvider, OllamaEmbeddingProvider};
pub use generation::{GenerationError, OllamaGenerator, TextGenerator};
pub use index::EmbeddingIndex;
pub use profile::{DataProfile, Readiness, Table, analyze};
pub use retriever::Retriever;
pub use router::{QueryRouter, RouterOutcome, SessionState};
pub use types::AssistantError;
