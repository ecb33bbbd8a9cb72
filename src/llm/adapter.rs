//! Generation adapter: default system prompt and timeout around a backend

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use tracing::warn;

use super::GenerationRequest;
use super::Generator;
use super::DEFAULT_SYSTEM_PROMPT;
use crate::config::AppConfig;
use crate::errors::PdfRagError;
use crate::errors::Result;

#[derive(Clone)]
pub struct GenerationAdapter {
    backend: Arc<dyn Generator>,
    default_system_prompt: String,
    timeout: Duration,
}

impl GenerationAdapter {
    pub fn new(backend: Arc<dyn Generator>, timeout: Duration) -> Self {
        Self {
            backend,
            default_system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            timeout,
        }
    }

    pub fn from_config(backend: Arc<dyn Generator>, config: &AppConfig) -> Self {
        let adapter = Self::new(backend, Duration::from_secs(config.llm.timeout_secs));
        match &config.llm.system_prompt {
            Some(prompt) => adapter.with_system_prompt(prompt.clone()),
            None => adapter,
        }
    }

    /// Replace the system prompt used when callers pass none
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.default_system_prompt = prompt.into();
        self
    }

    #[must_use]
    pub fn system_prompt(&self) -> &str {
        &self.default_system_prompt
    }

    /// Generate a completion for `prompt` with `model`.
    ///
    /// # Errors
    /// - `Generation` on backend failure or when the timeout expires
    pub async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        model: &str,
    ) -> Result<String> {
        let request = GenerationRequest {
            prompt,
            system_prompt: system_prompt.unwrap_or(self.default_system_prompt.as_str()),
            model,
        };

        debug!("Generating with model {} ({} prompt chars)", model, prompt.len());

        match tokio::time::timeout(self.timeout, self.backend.generate(request)).await {
            Ok(result) => result,
            Err(_) => Err(PdfRagError::Generation(format!(
                "model {model} did not answer within {}s",
                self.timeout.as_secs()
            ))),
        }
    }

    /// Like [`Self::generate`], but a failure becomes displayable text
    pub async fn generate_or_apologize(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        model: &str,
    ) -> String {
        match self.generate(prompt, system_prompt, model).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Generation failed: {}", e);
                format!("Error communicating with language model: {e}")
            }
        }
    }
}
