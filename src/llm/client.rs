//! HTTP chat-completion client for Ollama and OpenAI-compatible servers

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use super::GenerationRequest;
use super::Generator;
use crate::errors::PdfRagError;
use crate::errors::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    /// Ollama `/api/chat`
    Ollama,
    /// OpenAI-compatible `/chat/completions`
    OpenAI,
}

pub struct LlmClient {
    provider: LlmProvider,
    endpoint: String,
    api_key: Option<String>,
    client: Client,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

impl LlmClient {
    /// Timeouts are enforced by [`super::GenerationAdapter`], not here.
    pub fn new(provider: LlmProvider, endpoint: String, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| PdfRagError::Http(e.to_string()))?;

        Ok(Self {
            provider,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    fn messages<'a>(request: &GenerationRequest<'a>) -> Vec<ChatMessage<'a>> {
        let mut messages = Vec::with_capacity(2);
        if !request.system_prompt.is_empty() {
            messages.push(ChatMessage {
                role: "system",
                content: request.system_prompt,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: request.prompt,
        });
        messages
    }

    async fn chat_ollama(&self, request: GenerationRequest<'_>) -> Result<String> {
        #[derive(Serialize)]
        struct OllamaChatRequest<'a> {
            model: &'a str,
            messages: Vec<ChatMessage<'a>>,
            stream: bool,
        }

        #[derive(Deserialize)]
        struct OllamaChatResponse {
            message: AssistantMessage,
        }

        let url = format!("{}/api/chat", self.endpoint);
        debug!("Calling Ollama chat API: {} (model {})", url, request.model);

        let body = OllamaChatRequest {
            model: request.model,
            messages: Self::messages(&request),
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| PdfRagError::Generation(format!("request to {url} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(PdfRagError::Generation(format!(
                "Ollama returned {status}: {error_text}"
            )));
        }

        let parsed: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| PdfRagError::Generation(format!("failed to parse Ollama response: {e}")))?;

        Ok(parsed.message.content)
    }

    async fn chat_openai(&self, request: GenerationRequest<'_>) -> Result<String> {
        #[derive(Serialize)]
        struct OpenAiChatRequest<'a> {
            model: &'a str,
            messages: Vec<ChatMessage<'a>>,
        }

        #[derive(Deserialize)]
        struct OpenAiChatResponse {
            choices: Vec<ChatChoice>,
        }

        #[derive(Deserialize)]
        struct ChatChoice {
            message: AssistantMessage,
        }

        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| PdfRagError::Config("OpenAI API key not provided".to_string()))?;

        let url = format!("{}/chat/completions", self.endpoint);
        debug!("Calling OpenAI chat completions: {} (model {})", url, request.model);

        let body = OpenAiChatRequest {
            model: request.model,
            messages: Self::messages(&request),
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key.trim())
            .json(&body)
            .send()
            .await
            .map_err(|e| PdfRagError::Generation(format!("request to {url} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(PdfRagError::Generation(format!(
                "OpenAI returned {status}: {error_text}"
            )));
        }

        let parsed: OpenAiChatResponse = response
            .json()
            .await
            .map_err(|e| PdfRagError::Generation(format!("failed to parse OpenAI response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| PdfRagError::Generation("OpenAI response had no choices".to_string()))
    }
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: String,
}

#[async_trait]
impl Generator for LlmClient {
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<String> {
        match self.provider {
            LlmProvider::Ollama => self.chat_ollama(request).await,
            LlmProvider::OpenAI => self.chat_openai(request).await,
        }
    }
}
