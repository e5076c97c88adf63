//! Assistant configuration: defaults, builder setters, env overrides.
//!
//! Resolution order (later wins): compiled defaults, then `PIM_ASSISTANT_*`
//! environment variables (a `.env` file is honoured via `dotenvy`), then any
//! builder setters applied by the caller.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::types::AssistantError;

/// Knowledge files shipped with the assistant, in ingestion order.
pub const DEFAULT_KNOWLEDGE_FILES: &[&str] = &[
    "pim_basics.md",
    "mdm_basics.md",
    "attributes.md",
    "data_quality.md",
];

/// Generation endpoint settings.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Ollama-style generate endpoint.
    pub endpoint: Url,
    /// Model identifier sent with every request.
    pub model: String,
    /// Hard bound on one generation call.
    pub timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse("http://localhost:11434/api/generate")
                .expect("default generate endpoint is a valid URL"),
            model: "mistral:latest".to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Embedding endpoint settings. Build-time and query-time embeddings must
/// use the same model, so there is exactly one of these per assistant.
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub endpoint: Url,
    pub model: String,
    pub timeout: Duration,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse("http://localhost:11434/api/embeddings")
                .expect("default embeddings endpoint is a valid URL"),
            model: "nomic-embed-text".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Top-level assistant configuration.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// Directory holding the fixed knowledge files.
    pub knowledge_dir: PathBuf,
    /// File names resolved against `knowledge_dir`.
    pub knowledge_files: Vec<String>,
    /// Optional directory of page-structured reference documents.
    pub reference_dir: Option<PathBuf>,
    /// Character budget per passage.
    pub chunk_chars: usize,
    /// Characters shared between consecutive chunks of one document.
    pub overlap_chars: usize,
    /// Passages retrieved per query.
    pub top_k: usize,
    pub generation: GenerationConfig,
    pub embedding: EmbeddingConfig,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            knowledge_dir: PathBuf::from("knowledge_base"),
            knowledge_files: DEFAULT_KNOWLEDGE_FILES
                .iter()
                .map(|name| (*name).to_string())
                .collect(),
            reference_dir: None,
            chunk_chars: 1200,
            overlap_chars: 200,
            top_k: 2,
            generation: GenerationConfig::default(),
            embedding: EmbeddingConfig::default(),
        }
    }
}

impl AssistantConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `PIM_ASSISTANT_*` environment variables.
    ///
    /// Recognised keys: `KNOWLEDGE_DIR`, `REFERENCE_DIR`, `TOP_K`,
    /// `GENERATE_URL`, `MODEL`, `TIMEOUT_SECS`, `EMBED_URL`, `EMBED_MODEL`.
    pub fn from_env() -> Result<Self, AssistantError> {
        dotenvy::dotenv().ok();
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("PIM_ASSISTANT_KNOWLEDGE_DIR") {
            config.knowledge_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("PIM_ASSISTANT_REFERENCE_DIR") {
            config.reference_dir = Some(PathBuf::from(dir));
        }
        if let Ok(raw) = std::env::var("PIM_ASSISTANT_TOP_K") {
            config.top_k = raw
                .parse()
                .map_err(|_| env_error("PIM_ASSISTANT_TOP_K", &raw, "a positive integer"))?;
        }
        if let Ok(raw) = std::env::var("PIM_ASSISTANT_GENERATE_URL") {
            config.generation.endpoint = Url::parse(&raw)
                .map_err(|_| env_error("PIM_ASSISTANT_GENERATE_URL", &raw, "a valid URL"))?;
        }
        if let Ok(model) = std::env::var("PIM_ASSISTANT_MODEL") {
            config.generation.model = model;
        }
        if let Ok(raw) = std::env::var("PIM_ASSISTANT_TIMEOUT_SECS") {
            let secs: u64 = raw
                .parse()
                .map_err(|_| env_error("PIM_ASSISTANT_TIMEOUT_SECS", &raw, "seconds"))?;
            config.generation.timeout = Duration::from_secs(secs);
        }
        if let Ok(raw) = std::env::var("PIM_ASSISTANT_EMBED_URL") {
            config.embedding.endpoint = Url::parse(&raw)
                .map_err(|_| env_error("PIM_ASSISTANT_EMBED_URL", &raw, "a valid URL"))?;
        }
        if let Ok(model) = std::env::var("PIM_ASSISTANT_EMBED_MODEL") {
            config.embedding.model = model;
        }

        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_knowledge_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.knowledge_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_knowledge_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.knowledge_files = files.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_reference_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.reference_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_chunking(mut self, chunk_chars: usize, overlap_chars: usize) -> Self {
        self.chunk_chars = chunk_chars;
        self.overlap_chars = overlap_chars;
        self
    }

    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    #[must_use]
    pub fn with_generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    #[must_use]
    pub fn with_embedding(mut self, embedding: EmbeddingConfig) -> Self {
        self.embedding = embedding;
        self
    }

    /// Rejects configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), AssistantError> {
        if self.knowledge_files.is_empty() && self.reference_dir.is_none() {
            return Err(AssistantError::Config(
                "no knowledge sources configured".to_string(),
            ));
        }
        if self.chunk_chars == 0 {
            return Err(AssistantError::Config(
                "chunk_chars must be greater than zero".to_string(),
            ));
        }
        if self.overlap_chars >= self.chunk_chars {
            return Err(AssistantError::Config(format!(
                "overlap_chars ({}) must be smaller than chunk_chars ({})",
                self.overlap_chars, self.chunk_chars
            )));
        }
        if self.top_k == 0 {
            return Err(AssistantError::Config(
                "top_k must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_error(key: &str, value: &str, expected: &str) -> AssistantError {
    AssistantError::Config(format!("{key}='{value}' is not {expected}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        AssistantConfig::default().validate().unwrap();
    }

    #[test]
    fn default_file_list_matches_knowledge_base() {
        let config = AssistantConfig::default();
        assert_eq!(config.knowledge_files.len(), 4);
        assert_eq!(config.knowledge_files[0], "pim_basics.md");
    }

    #[test]
    fn overlap_must_stay_below_chunk_budget() {
        let config = AssistantConfig::default().with_chunking(100, 100);
        assert!(matches!(
            config.validate(),
            Err(AssistantError::Config(_))
        ));
    }

    #[test]
    fn zero_top_k_rejected() {
        let config = AssistantConfig::default().with_top_k(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_sources_rejected() {
        let config = AssistantConfig::default().with_knowledge_files(Vec::<String>::new());
        assert!(config.validate().is_err());
    }
}
