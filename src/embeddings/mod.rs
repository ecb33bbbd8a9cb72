//! Embeddings generation module
//!
//! This module provides text embeddings from various providers:
//! - Ollama (local models, e.g. `nomic-embed-text`)
//! - OpenAI (text-embedding-3-small, etc.)
//! - A deterministic hashing embedder for offline runs and tests
//!
//! # Examples
//!
//! ```rust,no_run
//! use pdfrag::config::AppConfig;
//! use pdfrag::embeddings;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let embedder = embeddings::from_config(&config)?;
//!
//!     let embedding = embedder.embed("Hello, world!").await?;
//!     println!("Generated embedding with {} dimensions", embedding.len());
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod hash;

use std::sync::Arc;

use async_trait::async_trait;

pub use client::EmbeddingClient;
pub use client::EmbeddingProvider;
pub use hash::HashEmbedder;

use crate::config::AppConfig;
use crate::errors::PdfRagError;
use crate::errors::Result;

/// Anything that turns text into a fixed-length vector.
///
/// Implementations must be deterministic for a given text and model.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed several texts, preserving order. Fails if any text fails.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Model identifier, for logs
    fn model_name(&self) -> &str;
}

/// Embed `texts` with at most `concurrency` requests in flight.
///
/// Output order follows input order; the first failure fails the batch.
pub async fn embed_buffered<E>(
    embedder: &E,
    texts: &[&str],
    concurrency: usize,
) -> Result<Vec<Vec<f32>>>
where
    E: Embedder + ?Sized,
{
    use futures::stream;
    use futures::stream::StreamExt;
    use futures::stream::TryStreamExt;

    // Futures are lazy; collecting them up front keeps the closure out of the
    // async state machine (works around a rustc higher-ranked lifetime error)
    let futures: Vec<_> = texts.iter().map(|text| embedder.embed(text)).collect();
    stream::iter(futures)
        .buffered(concurrency.max(1))
        .try_collect()
        .await
}

/// Build the embedder selected by `[embeddings]`
pub fn from_config(config: &AppConfig) -> Result<Arc<dyn Embedder>> {
    let settings = &config.embeddings;
    let embedder: Arc<dyn Embedder> = match settings.provider.as_str() {
        "hash" => Arc::new(HashEmbedder::new(settings.dimension)),
        "ollama" => Arc::new(EmbeddingClient::new(
            EmbeddingProvider::Ollama,
            settings.model.clone(),
            settings.endpoint.clone(),
            None,
            settings.timeout_secs,
        )?),
        "openai" => Arc::new(EmbeddingClient::new(
            EmbeddingProvider::OpenAI,
            settings.model.clone(),
            settings.endpoint.clone(),
            settings.api_key.clone(),
            settings.timeout_secs,
        )?),
        other => {
            return Err(PdfRagError::Config(format!(
                "unknown embeddings provider: {other}"
            )))
        }
    };

    tracing::info!(
        provider = %settings.provider,
        model = embedder.model_name(),
        "Embedding provider configured"
    );
    Ok(embedder)
}
