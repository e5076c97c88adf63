//! Query routing, session state, and prompt composition.
//!
//! Three mutually exclusive branches, evaluated in this order for every
//! query:
//!
//! 1. greeting/thanks → canned reply, no retrieval, no generation;
//! 2. a dataset profile is attached → data-aware prompt combining the
//!    stored report with retrieved knowledge context;
//! 3. otherwise → either the fixed upload instruction (the query mentions
//!    the user's own data but nothing is attached) or the general
//!    domain-restricted prompt.
//!
//! The rules are deliberately plain ordered tables, not dispatch.

use crate::profile::{DataProfile, Table, analyze};
use crate::retriever::Retriever;
use crate::types::AssistantError;

/// Normalized phrases answered without touching the model.
pub const GREETING_PHRASES: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "good morning",
    "good afternoon",
    "good evening",
    "thanks",
    "thank you",
    "thx",
];

/// Phrases that signal a question about the user's own dataset.
pub const DATA_KEYWORDS: &[&str] = &[
    "my data",
    "my file",
    "my sheet",
    "my upload",
    "my dataset",
    "uploaded file",
];

pub const GREETING_REPLY: &str = "Hello! Ask me anything about PIM, MDM, product attributes, \
or data quality. You can also upload a CSV and I will assess its readiness.";

pub const UPLOAD_INSTRUCTION: &str = "I don't see an uploaded dataset yet. Please upload a CSV \
file first, and I will analyze it before answering questions about your data.";

/// Sentence the model is instructed to emit when the context has no answer.
pub const OUT_OF_CONTEXT_FALLBACK: &str =
    "I can only help with PIM and MDM topics, and I could not find that in the knowledge base.";

/// Lowercases, strips punctuation, and collapses whitespace.
fn normalize(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    let mut last_was_space = true;
    for c in query.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
            last_was_space = false;
        } else if !last_was_space {
            out.push(' ');
            last_was_space = true;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Exact match against [`GREETING_PHRASES`] after normalization.
pub fn is_greeting(query: &str) -> bool {
    let normalized = normalize(query);
    GREETING_PHRASES.iter().any(|phrase| normalized == *phrase)
}

/// Substring match against [`DATA_KEYWORDS`] after normalization.
pub fn mentions_user_data(query: &str) -> bool {
    let normalized = normalize(query);
    DATA_KEYWORDS.iter().any(|kw| normalized.contains(kw))
}

/// Per-session mutable state: the uploaded dataset, its filename, and the
/// derived profile. Never shared across sessions.
#[derive(Default)]
pub struct SessionState {
    dataset_name: Option<String>,
    table: Option<Table>,
    profile: Option<DataProfile>,
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dataset_name(&self) -> Option<&str> {
        self.dataset_name.as_deref()
    }

    pub fn profile(&self) -> Option<&DataProfile> {
        self.profile.as_ref()
    }

    /// Attaches a dataset and computes its profile.
    ///
    /// Re-uploading a file with the name already attached is a no-op skip
    /// (returns `false`); a different name replaces the dataset and its
    /// profile.
    pub fn attach_dataset(&mut self, name: &str, table: Table) -> bool {
        if self.dataset_name.as_deref() == Some(name) {
            tracing::debug!(dataset = name, "same filename re-uploaded; keeping existing profile");
            return false;
        }
        self.profile = Some(analyze(&table));
        self.table = Some(table);
        self.dataset_name = Some(name.to_string());
        tracing::info!(dataset = name, "dataset attached and profiled");
        true
    }

    /// Forces recomputation of the profile from the attached dataset,
    /// bypassing the filename short-circuit. Returns `false` when no
    /// dataset is attached.
    pub fn reanalyze(&mut self) -> bool {
        match &self.table {
            Some(table) => {
                self.profile = Some(analyze(table));
                true
            }
            None => false,
        }
    }

    /// Detaches the dataset and clears the profile.
    pub fn detach(&mut self) {
        self.dataset_name = None;
        self.table = None;
        self.profile = None;
    }
}

/// What the router decided to do with a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterOutcome {
    /// Answer directly; the generation endpoint must not be called.
    Reply(String),
    /// Send this composed prompt to the generator.
    Generate(String),
}

/// Classifies queries and composes prompts. Reads session state, never
/// mutates it.
#[derive(Clone)]
pub struct QueryRouter {
    retriever: Retriever,
    top_k: usize,
}

impl QueryRouter {
    pub fn new(retriever: Retriever, top_k: usize) -> Self {
        Self { retriever, top_k }
    }

    pub async fn route(
        &self,
        query: &str,
        session: &SessionState,
    ) -> Result<RouterOutcome, AssistantError> {
        if is_greeting(query) {
            return Ok(RouterOutcome::Reply(GREETING_REPLY.to_string()));
        }

        if let Some(profile) = session.profile() {
            let context = self.retriever.retrieve(query, self.top_k).await?;
            let prompt = compose_data_prompt(&profile.render(), &context, query);
            return Ok(RouterOutcome::Generate(prompt));
        }

        if mentions_user_data(query) {
            return Ok(RouterOutcome::Reply(UPLOAD_INSTRUCTION.to_string()));
        }

        let context = self.retriever.retrieve(query, self.top_k).await?;
        Ok(RouterOutcome::Generate(compose_general_prompt(&context, query)))
    }
}

/// Domain-restricted prompt for general knowledge questions.
pub fn compose_general_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a PIM and MDM domain assistant.\n\
         \n\
         You must answer ONLY questions related to:\n\
         - Product Information Management (PIM)\n\
         - Master Data Management (MDM)\n\
         - Product attributes\n\
         - Data quality and governance\n\
         \n\
         Answer only from the context below. If the answer is not in the \
         context, reply exactly: \"{OUT_OF_CONTEXT_FALLBACK}\"\n\
         \n\
         Context:\n\
         {context}\n\
         \n\
         Question:\n\
         {question}\n\
         \n\
         Answer clearly and in business-friendly language.\n"
    )
}

/// Data-aware prompt combining the stored profile report with retrieved
/// knowledge context. The three headings are fixed output format.
pub fn compose_data_prompt(report: &str, context: &str, question: &str) -> String {
    format!(
        "You are a PIM and MDM domain assistant reviewing the user's uploaded dataset.\n\
         \n\
         Rules:\n\
         - Answer only from the data analysis and knowledge context below.\n\
         - Explain why each finding matters using the knowledge context.\n\
         - Structure the answer under exactly these headings:\n\
           \"What I Found\" / \"Why It Matters\" / \"What to Check Next\".\n\
         \n\
         Data analysis:\n\
         {report}\n\
         \n\
         Knowledge context:\n\
         {context}\n\
         \n\
         Question:\n\
         {question}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Table;

    fn sample_table() -> Table {
        Table::new(
            vec!["sku".to_string(), "name".to_string()],
            vec![vec!["A-1".to_string(), "Lamp".to_string()]],
        )
        .unwrap()
    }

    #[test]
    fn normalization_strips_punctuation_and_case() {
        assert_eq!(normalize("  Hello!!  "), "hello");
        assert_eq!(normalize("Good   MORNING."), "good morning");
        assert_eq!(normalize("what's MDM?"), "what s mdm");
    }

    #[test]
    fn greeting_variants_match() {
        for query in ["hi", "Hello!", "  HEY  ", "thank you", "Thanks."] {
            assert!(is_greeting(query), "expected greeting: {query:?}");
        }
        for query in ["hi there, what is PIM?", "say hello to MDM", "hithere"] {
            assert!(!is_greeting(query), "not a bare greeting: {query:?}");
        }
    }

    #[test]
    fn data_keywords_match_within_sentences() {
        assert!(mentions_user_data("What's wrong with my data?"));
        assert!(mentions_user_data("Can you check MY FILE please"));
        assert!(!mentions_user_data("What is master data management?"));
    }

    #[test]
    fn same_filename_upload_is_a_noop() {
        let mut session = SessionState::new();
        assert!(session.attach_dataset("products.csv", sample_table()));
        let first_report = session.profile().unwrap().render();

        assert!(!session.attach_dataset("products.csv", sample_table()));
        assert_eq!(session.profile().unwrap().render(), first_report);
    }

    #[test]
    fn different_filename_replaces_the_profile() {
        let mut session = SessionState::new();
        session.attach_dataset("products.csv", sample_table());

        let other = Table::new(
            vec!["brand".to_string()],
            vec![vec!["Lumo".to_string()]],
        )
        .unwrap();
        assert!(session.attach_dataset("brands.csv", other));
        assert_eq!(session.dataset_name(), Some("brands.csv"));
        assert!(
            session
                .profile()
                .unwrap()
                .render()
                .starts_with("Data readiness: Low")
        );
    }

    #[test]
    fn reanalyze_requires_an_attached_dataset() {
        let mut session = SessionState::new();
        assert!(!session.reanalyze());

        session.attach_dataset("products.csv", sample_table());
        assert!(session.reanalyze());
        assert!(session.profile().is_some());
    }

    #[test]
    fn detach_clears_everything() {
        let mut session = SessionState::new();
        session.attach_dataset("products.csv", sample_table());
        session.detach();
        assert!(session.dataset_name().is_none());
        assert!(session.profile().is_none());
        assert!(!session.reanalyze());
    }

    #[test]
    fn prompts_embed_their_evidence_blocks() {
        let general = compose_general_prompt("CTX", "what is PIM?");
        assert!(general.contains("Context:\nCTX"));
        assert!(general.contains(OUT_OF_CONTEXT_FALLBACK));

        let data = compose_data_prompt("REPORT", "CTX", "is my data ok?");
        assert!(data.contains("Data analysis:\nREPORT"));
        assert!(data.contains("What I Found"));
        assert!(data.contains("What to Check Next"));
    }
}
