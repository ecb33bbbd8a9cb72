//! Conversational workflow: RETRIEVE -> GENERATE -> FINALIZE
//!
//! Stages report failures as `Result`s and the orchestrator folds each
//! output into a new [`ConversationState`]: retrieval and generation errors
//! degrade to an empty context and an apology. Anything that escapes a stage
//! (a panic in a backend, say) is caught by [`RagWorkflow::process_message`]
//! and turned into an error response.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use serde::Serialize;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;
use uuid::Uuid;

use super::retriever::Retrieval;
use super::retriever::Retriever;
use crate::errors::PdfRagError;
use crate::errors::Result;
use crate::llm::GenerationAdapter;
use crate::llm::RagPrompts;
use crate::models::Source;

/// Everything known about one conversational turn
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationState {
    pub query: String,
    pub session_id: Option<String>,
    pub context: Vec<String>,
    pub sources: Vec<Source>,
    pub response: String,
    pub model_selector: String,
}

impl ConversationState {
    /// A blank session id counts as absent
    pub fn new(
        query: impl Into<String>,
        session_id: Option<String>,
        model_selector: impl Into<String>,
    ) -> Self {
        Self {
            query: query.into(),
            session_id: session_id.filter(|id| !id.trim().is_empty()),
            model_selector: model_selector.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_retrieval(self, retrieval: Retrieval) -> Self {
        let sources = retrieval.sources();
        Self {
            context: retrieval.context,
            sources,
            ..self
        }
    }

    #[must_use]
    pub fn with_response(self, response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            ..self
        }
    }

    /// Assign a session id if none was supplied
    #[must_use]
    pub fn finalized(self) -> Self {
        if self.session_id.is_some() {
            return self;
        }
        Self {
            session_id: Some(new_session_id()),
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Retrieve,
    Generate,
    Finalize,
}

impl Stage {
    /// Execution order
    pub const PIPELINE: [Self; 3] = [Self::Retrieve, Self::Generate, Self::Finalize];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Retrieve => "retrieve",
            Self::Generate => "generate",
            Self::Finalize => "finalize",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of one chat turn, as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatOutcome {
    pub response: String,
    pub session_id: String,
    pub sources: Vec<Source>,
}

impl From<ConversationState> for ChatOutcome {
    fn from(state: ConversationState) -> Self {
        Self {
            response: state.response,
            session_id: state.session_id.unwrap_or_else(new_session_id),
            sources: state.sources,
        }
    }
}

pub struct RagWorkflow {
    retriever: Retriever,
    generator: GenerationAdapter,
    top_k: usize,
}

impl RagWorkflow {
    pub fn new(retriever: Retriever, generator: GenerationAdapter, top_k: usize) -> Self {
        Self {
            retriever,
            generator,
            top_k,
        }
    }

    pub const fn top_k(&self) -> usize {
        self.top_k
    }

    /// RETRIEVE: top-k passages for the query
    pub async fn retrieve(&self, state: &ConversationState) -> Result<Retrieval> {
        self.retriever.try_retrieve(&state.query, self.top_k).await
    }

    /// GENERATE: answer the query from the retrieved context
    pub async fn generate(&self, state: &ConversationState) -> Result<String> {
        let prompt = RagPrompts::build_context_prompt(&state.context, &state.query);
        self.generator
            .generate(&prompt, None, &state.model_selector)
            .await
    }

    /// FINALIZE: guarantee a session id
    pub fn finalize(state: ConversationState) -> ConversationState {
        state.finalized()
    }

    /// Run `stage` and fold its output into the state. Retrieval and
    /// generation errors degrade to empty context and an apology.
    async fn advance(&self, stage: Stage, state: ConversationState) -> ConversationState {
        match stage {
            Stage::Retrieve => {
                let retrieval = self.retriever.retrieve(&state.query, self.top_k).await;
                debug!("Retrieve stage found {} passages", retrieval.len());
                state.with_retrieval(retrieval)
            }
            Stage::Generate => {
                let response = match self.generate(&state).await {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("Generation failed: {}", e);
                        format!("Sorry, I encountered an error while processing your request: {e}")
                    }
                };
                state.with_response(response)
            }
            Stage::Finalize => Self::finalize(state),
        }
    }

    /// Run one conversational turn. Never fails: an unexpected fault in any
    /// stage yields an error response carrying the session id known so far.
    pub async fn process_message(
        &self,
        message: &str,
        session_id: Option<String>,
        model: &str,
    ) -> ChatOutcome {
        info!("Processing message with model {}", model);

        let mut state = ConversationState::new(message, session_id, model);
        for stage in Stage::PIPELINE {
            let session_so_far = state.session_id.clone();
            let outcome = AssertUnwindSafe(self.advance(stage, state))
                .catch_unwind()
                .await;
            state = match outcome {
                Ok(next) => next,
                Err(panic) => {
                    let cause = panic_message(panic.as_ref());
                    let failure = PdfRagError::Workflow(format!("{stage} stage failed: {cause}"));
                    error!("{}", failure);
                    return ChatOutcome {
                        response: format!("Error processing message: {cause}"),
                        session_id: session_so_far.unwrap_or_else(new_session_id),
                        sources: Vec::new(),
                    };
                }
            };
        }

        ChatOutcome::from(state)
    }
}

pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown failure".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::embeddings::Embedder;
    use crate::embeddings::HashEmbedder;
    use crate::index::VectorIndex;
    use crate::llm::GenerationRequest;
    use crate::llm::Generator;
    use crate::models::Fragment;

    /// Returns a fixed answer and records the prompt and model it saw
    #[derive(Default)]
    struct ScriptedGenerator {
        seen: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Generator for ScriptedGenerator {
        async fn generate(&self, request: GenerationRequest<'_>) -> Result<String> {
            self.seen
                .lock()
                .unwrap()
                .push((request.prompt.to_string(), request.model.to_string()));
            Ok("The sky is blue.".to_string())
        }
    }

    struct RefusingGenerator;

    #[async_trait]
    impl Generator for RefusingGenerator {
        async fn generate(&self, _request: GenerationRequest<'_>) -> Result<String> {
            Err(PdfRagError::Generation("model not found".to_string()))
        }
    }

    struct PanickingGenerator;

    #[async_trait]
    impl Generator for PanickingGenerator {
        async fn generate(&self, _request: GenerationRequest<'_>) -> Result<String> {
            panic!("backend exploded")
        }
    }

    /// Embeds documents, fails on every query after `armed` is set
    struct OutageEmbedder {
        inner: HashEmbedder,
        armed: std::sync::atomic::AtomicBool,
    }

    #[async_trait]
    impl Embedder for OutageEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            if self.armed.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(PdfRagError::Embedding("provider offline".to_string()));
            }
            self.inner.embed(text).await
        }

        fn model_name(&self) -> &str {
            "outage"
        }
    }

    async fn sky_index(embedder: Arc<dyn Embedder>) -> Arc<VectorIndex> {
        let index = Arc::new(VectorIndex::new(embedder));
        index
            .insert(vec![Fragment::new("The sky is blue.", "sky.pdf", 0)])
            .await
            .unwrap();
        index
    }

    fn workflow(index: Arc<VectorIndex>, generator: Arc<dyn Generator>) -> RagWorkflow {
        RagWorkflow::new(
            Retriever::new(index),
            GenerationAdapter::new(generator, Duration::from_secs(5)),
            4,
        )
    }

    #[test]
    fn test_blank_session_counts_as_absent() {
        assert_eq!(ConversationState::new("q", Some(String::new()), "m").session_id, None);
        assert_eq!(ConversationState::new("q", Some("  ".to_string()), "m").session_id, None);
        assert_eq!(
            ConversationState::new("q", Some("abc".to_string()), "m").session_id.as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn test_finalize_keeps_existing_session() {
        let state = ConversationState::new("q", Some("abc".to_string()), "m");
        assert_eq!(RagWorkflow::finalize(state).session_id.as_deref(), Some("abc"));

        let fresh = RagWorkflow::finalize(ConversationState::new("q", None, "m"));
        let id = fresh.session_id.unwrap();
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[tokio::test]
    async fn test_stages_report_errors() {
        let index = sky_index(Arc::new(HashEmbedder::new(384))).await;
        let workflow = workflow(index, Arc::new(RefusingGenerator));
        let state = ConversationState::new("What color is the sky?", None, "llama2");

        let retrieval = workflow.retrieve(&state).await.unwrap();
        assert_eq!(retrieval.context, vec!["The sky is blue.".to_string()]);

        let state = state.with_retrieval(retrieval);
        assert!(matches!(
            workflow.generate(&state).await,
            Err(PdfRagError::Generation(_))
        ));
    }

    #[test]
    fn test_stage_order() {
        assert_eq!(
            Stage::PIPELINE.map(Stage::name),
            ["retrieve", "generate", "finalize"]
        );
    }

    #[tokio::test]
    async fn test_process_message_answers_from_context() {
        let generator = Arc::new(ScriptedGenerator::default());
        let index = sky_index(Arc::new(HashEmbedder::new(384))).await;
        let workflow = workflow(index, generator.clone());

        let outcome = workflow
            .process_message("What color is the sky?", None, "mistral")
            .await;

        assert_eq!(outcome.response, "The sky is blue.");
        assert_eq!(outcome.sources.len(), 1);
        assert_eq!(outcome.sources[0].source, "sky.pdf");
        assert!(Uuid::parse_str(&outcome.session_id).is_ok());

        let seen = generator.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].0.contains("Context: The sky is blue."));
        assert!(seen[0].0.contains("Question: What color is the sky?"));
        assert_eq!(seen[0].1, "mistral");
    }

    #[tokio::test]
    async fn test_session_id_is_echoed() {
        let index = sky_index(Arc::new(HashEmbedder::new(384))).await;
        let workflow = workflow(index, Arc::new(ScriptedGenerator::default()));

        let first = workflow.process_message("hello", None, "llama2").await;
        let second = workflow
            .process_message("again", Some(first.session_id.clone()), "llama2")
            .await;
        assert_eq!(first.session_id, second.session_id);
    }

    #[tokio::test]
    async fn test_empty_index_uses_sentinel() {
        let generator = Arc::new(ScriptedGenerator::default());
        let index = Arc::new(VectorIndex::new(Arc::new(HashEmbedder::new(384))));
        let workflow = workflow(index, generator.clone());

        let outcome = workflow.process_message("anything?", None, "llama2").await;
        assert!(outcome.sources.is_empty());
        let seen = generator.seen.lock().unwrap();
        assert!(seen[0].0.contains("No relevant context found."));
    }

    #[tokio::test]
    async fn test_retrieval_outage_degrades_to_no_context() {
        let embedder = Arc::new(OutageEmbedder {
            inner: HashEmbedder::new(384),
            armed: std::sync::atomic::AtomicBool::new(false),
        });
        let index = sky_index(embedder.clone()).await;
        embedder.armed.store(true, std::sync::atomic::Ordering::SeqCst);

        let generator = Arc::new(ScriptedGenerator::default());
        let workflow = workflow(index, generator.clone());
        let outcome = workflow
            .process_message("What color is the sky?", Some("s1".to_string()), "llama2")
            .await;

        assert!(outcome.sources.is_empty());
        assert_eq!(outcome.session_id, "s1");
        assert_eq!(outcome.response, "The sky is blue.");
        assert!(generator.seen.lock().unwrap()[0]
            .0
            .contains("No relevant context found."));
    }

    #[tokio::test]
    async fn test_generation_failure_becomes_apology() {
        let index = sky_index(Arc::new(HashEmbedder::new(384))).await;
        let workflow = workflow(index, Arc::new(RefusingGenerator));

        let outcome = workflow
            .process_message("What color is the sky?", None, "nope")
            .await;
        assert!(outcome
            .response
            .starts_with("Sorry, I encountered an error while processing your request:"));
        assert!(outcome.response.contains("model not found"));
        // Retrieval still succeeded, so sources survive
        assert_eq!(outcome.sources.len(), 1);
        assert!(!outcome.session_id.is_empty());
    }

    #[tokio::test]
    async fn test_stage_panic_becomes_error_response() {
        let index = sky_index(Arc::new(HashEmbedder::new(384))).await;
        let workflow = workflow(index, Arc::new(PanickingGenerator));

        let outcome = workflow
            .process_message("What color is the sky?", Some("keep-me".to_string()), "llama2")
            .await;
        assert_eq!(outcome.response, "Error processing message: backend exploded");
        assert_eq!(outcome.session_id, "keep-me");
        assert!(outcome.sources.is_empty());

        let anonymous = workflow.process_message("again", None, "llama2").await;
        assert!(anonymous.response.starts_with("Error processing message:"));
        assert!(Uuid::parse_str(&anonymous.session_id).is_ok());
    }
}
