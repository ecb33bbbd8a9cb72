//! Language model access
//!
//! [`Generator`] is the seam to a chat-completion backend; [`LlmClient`]
//! talks to Ollama or an OpenAI-compatible API. [`GenerationAdapter`] adds
//! the default system prompt and the request timeout on top of any backend.

pub mod adapter;
pub mod client;
pub mod prompts;

use std::sync::Arc;

use async_trait::async_trait;

pub use adapter::GenerationAdapter;
pub use client::LlmClient;
pub use client::LlmProvider;
pub use prompts::PromptTemplate;
pub use prompts::RagPrompts;
pub use prompts::DEFAULT_SYSTEM_PROMPT;

use crate::config::AppConfig;
use crate::errors::PdfRagError;
use crate::errors::Result;

/// One chat-completion call
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub prompt: &'a str,
    pub system_prompt: &'a str,
    pub model: &'a str,
}

/// Chat-completion backend
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<String>;
}

/// Build the generation backend selected by `[llm]`
pub fn from_config(config: &AppConfig) -> Result<Arc<dyn Generator>> {
    let settings = &config.llm;
    let provider = match settings.provider.as_str() {
        "ollama" => LlmProvider::Ollama,
        "openai" => LlmProvider::OpenAI,
        other => {
            return Err(PdfRagError::Config(format!(
                "unknown llm provider: {other}"
            )))
        }
    };

    tracing::info!(
        provider = %settings.provider,
        default_model = %settings.default_model,
        "Generation provider configured"
    );

    Ok(Arc::new(LlmClient::new(
        provider,
        settings.endpoint.clone(),
        settings.api_key.clone(),
    )?))
}
