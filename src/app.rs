//! Assistant facade: bootstrap once, answer many.
//!
//! [`Assistant::bootstrap`] runs the whole startup pipeline (validate
//! config, load passages, build the index, wire the retriever and router)
//! and fails fast on anything fatal. After that, [`Assistant::answer`]
//! never fails because of retrieval or generation problems: those are
//! turned into a plain-language reply so a flaky endpoint never kills the
//! session.

use std::sync::Arc;

use crate::config::AssistantConfig;
use crate::embeddings::EmbeddingProvider;
use crate::generation::TextGenerator;
use crate::index::EmbeddingIndex;
use crate::ingestion::load_passages;
use crate::retriever::Retriever;
use crate::router::{QueryRouter, RouterOutcome, SessionState};
use crate::types::AssistantError;

/// The assembled question-answering pipeline.
pub struct Assistant<G: TextGenerator> {
    router: QueryRouter,
    generator: G,
}

impl<G: TextGenerator> Assistant<G> {
    /// Builds the full pipeline from configuration.
    ///
    /// This is the only place the embedding index is constructed; to pick
    /// up edited knowledge files, bootstrap a new assistant.
    pub async fn bootstrap(
        config: AssistantConfig,
        provider: Arc<dyn EmbeddingProvider>,
        generator: G,
    ) -> Result<Self, AssistantError> {
        config.validate()?;

        let passages = load_passages(&config).await?;
        let index = Arc::new(EmbeddingIndex::build(passages, provider.as_ref()).await?);
        let retriever = Retriever::new(index, provider);
        let router = QueryRouter::new(retriever, config.top_k);

        Ok(Self { router, generator })
    }

    /// Answers one query against the current session state.
    ///
    /// Query-time failures never escape: a failed retrieval or generation
    /// call is reported as the answer text instead, with the failure
    /// logged, so one flaky endpoint never kills the session.
    pub async fn answer(
        &self,
        query: &str,
        session: &SessionState,
    ) -> Result<String, AssistantError> {
        let outcome = match self.router.route(query, session).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(%err, "retrieval failed; answering with fallback message");
                return Ok(retrieval_failure_message(&err));
            }
        };
        match outcome {
            RouterOutcome::Reply(text) => Ok(text),
            RouterOutcome::Generate(prompt) => match self.generator.generate(&prompt).await {
                Ok(answer) => Ok(answer),
                Err(err) => {
                    tracing::warn!(%err, "generation failed; answering with fallback message");
                    Ok(err.user_message())
                }
            },
        }
    }

    pub fn router(&self) -> &QueryRouter {
        &self.router
    }
}

/// Plain-language reply shown when the knowledge base cannot be searched,
/// typically because the embeddings endpoint went away after startup.
fn retrieval_failure_message(err: &AssistantError) -> String {
    format!(
        "I could not search the knowledge base right now ({err}). \
         Check that Ollama is running and try again."
    )
}
