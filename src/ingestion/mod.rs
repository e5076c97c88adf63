//! Loading the knowledge base into retrievable passages.
//!
//! Two source kinds feed the index:
//!
//! * the fixed knowledge files configured in
//!   [`AssistantConfig::knowledge_files`], read from `knowledge_dir`;
//! * an optional reference directory whose files are treated as
//!   page-structured documents (pages separated by form-feed, `\u{0C}`).
//!
//! An unreadable individual source is logged and skipped; only an entirely
//! empty result set is fatal.

pub mod chunk;

use std::path::Path;

use tokio::fs;
use uuid::Uuid;

use crate::config::AssistantConfig;
use crate::types::AssistantError;

pub use chunk::chunk_text;

/// A unit of retrievable text with a stable source tag.
///
/// Passages are created once at index-build time and never mutated; the
/// embedding vector lives in [`crate::index::EmbeddingIndex`], keyed by
/// position.
#[derive(Debug, Clone)]
pub struct Passage {
    pub id: Uuid,
    /// Where the text came from, e.g. `pim_basics.md` or `handbook.txt#page2.1`.
    pub source: String,
    pub content: String,
}

impl Passage {
    fn new(source: String, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            content,
        }
    }
}

/// Reads every configured knowledge source and chunks it into passages.
///
/// Missing or unreadable sources are skipped with a warning. Fails with
/// [`AssistantError::EmptyKnowledgeBase`] when nothing could be loaded, so
/// index construction is never attempted on an empty corpus.
pub async fn load_passages(config: &AssistantConfig) -> Result<Vec<Passage>, AssistantError> {
    let mut passages = Vec::new();

    for file in &config.knowledge_files {
        let path = config.knowledge_dir.join(file);
        match fs::read_to_string(&path).await {
            Ok(text) => {
                push_chunks(&mut passages, file, &text, config);
            }
            Err(err) => {
                tracing::warn!(source = %path.display(), %err, "knowledge source unreadable; skipping");
            }
        }
    }

    if let Some(reference_dir) = &config.reference_dir {
        load_reference_documents(&mut passages, reference_dir, config).await;
    }

    if passages.is_empty() {
        return Err(AssistantError::EmptyKnowledgeBase);
    }

    tracing::info!(passages = passages.len(), "knowledge base loaded");
    Ok(passages)
}

async fn load_reference_documents(
    passages: &mut Vec<Passage>,
    dir: &Path,
    config: &AssistantConfig,
) {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(dir = %dir.display(), %err, "reference directory unreadable; skipping");
            return;
        }
    };

    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        match fs::read_to_string(&path).await {
            Ok(text) => {
                let pages: Vec<&str> = text.split('\u{0C}').collect();
                let multi_page = pages.len() > 1;
                for (page_no, page) in pages.iter().enumerate() {
                    let tag = if multi_page {
                        format!("{name}#page{}", page_no + 1)
                    } else {
                        name.clone()
                    };
                    push_chunks(passages, &tag, page, config);
                }
            }
            Err(err) => {
                tracing::warn!(source = %path.display(), %err, "reference document unreadable; skipping");
            }
        }
    }
}

fn push_chunks(passages: &mut Vec<Passage>, source: &str, text: &str, config: &AssistantConfig) {
    let chunks = chunk_text(text, config.chunk_chars, config.overlap_chars);
    let multi = chunks.len() > 1;
    for (i, chunk) in chunks.into_iter().enumerate() {
        let tag = if multi {
            format!("{source}#{}", i + 1)
        } else {
            source.to_string()
        };
        passages.push(Passage::new(tag, chunk));
    }
}
