//! Complete RAG service: Ingest -> Index -> Retrieve -> Generate

use std::sync::Arc;

use tracing::debug;
use tracing::info;
use tracing::warn;

use super::retriever::Retriever;
use super::workflow::ChatOutcome;
use super::workflow::RagWorkflow;
use crate::chunker::Chunker;
use crate::config::AppConfig;
use crate::embeddings;
use crate::embeddings::Embedder;
use crate::errors::PdfRagError;
use crate::errors::Result;
use crate::extract::PdfExtractor;
use crate::extract::TextExtractor;
use crate::index::VectorIndex;
use crate::llm;
use crate::llm::GenerationAdapter;
use crate::llm::Generator;
use crate::models::IndexStats;

/// Process-wide RAG service shared by every request
pub struct RagService {
    index: Arc<VectorIndex>,
    chunker: Chunker,
    workflow: RagWorkflow,
    extractor: Arc<dyn TextExtractor>,
    default_model: String,
    available_models: Vec<String>,
}

impl RagService {
    /// Create a new RAG service with the providers selected in `config`
    ///
    /// # Errors
    /// - Configuration errors (unknown provider, invalid chunking parameters)
    /// - HTTP client construction errors
    pub fn new(config: &AppConfig) -> Result<Self> {
        let embedder = embeddings::from_config(config)?;
        let generator = llm::from_config(config)?;
        Self::from_services(config, embedder, generator, Arc::new(PdfExtractor::new()))
    }

    /// Create from existing services
    pub fn from_services(
        config: &AppConfig,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        extractor: Arc<dyn TextExtractor>,
    ) -> Result<Self> {
        let chunker = Chunker::from_config(config)?;
        let index = Arc::new(VectorIndex::new(embedder));
        let workflow = RagWorkflow::new(
            Retriever::new(Arc::clone(&index)),
            GenerationAdapter::from_config(generator, config),
            config.top_k(),
        );

        info!(
            "RAG service ready: chunk size {}, overlap {}, top_k {}",
            chunker.chunk_size(),
            chunker.overlap(),
            config.top_k()
        );

        Ok(Self {
            index,
            chunker,
            workflow,
            extractor,
            default_model: config.default_model().to_string(),
            available_models: config.available_models().to_vec(),
        })
    }

    /// Chunk, embed and index one document's text.
    ///
    /// Returns the total number of indexed fragments afterwards.
    ///
    /// # Errors
    /// - `InvalidInput` for blank text or a blank source name
    /// - `Embedding` / `DimensionMismatch` from the index; nothing is committed then
    pub async fn ingest(&self, document_text: &str, source_name: &str) -> Result<usize> {
        if source_name.trim().is_empty() {
            return Err(PdfRagError::InvalidInput(
                "source name must not be empty".to_string(),
            ));
        }
        if document_text.trim().is_empty() {
            return Err(PdfRagError::InvalidInput(format!(
                "no text to index for {source_name}"
            )));
        }

        let fragments = self.chunker.fragments(document_text, source_name);
        debug!("Split {} into {} fragments", source_name, fragments.len());

        let total = self.index.insert(fragments).await?;
        info!("Indexed {}; index now holds {} fragments", source_name, total);
        Ok(total)
    }

    /// Extract text from an uploaded file, then [`Self::ingest`] it.
    ///
    /// # Errors
    /// - `Extraction` if the file can't be parsed or holds no text
    /// - anything [`Self::ingest`] returns
    pub async fn ingest_pdf(&self, bytes: &[u8], source_name: &str) -> Result<usize> {
        let Some(text) = self.extractor.extract(bytes).await? else {
            warn!("No extractable text in {}", source_name);
            return Err(PdfRagError::Extraction(format!(
                "could not extract text from {source_name}"
            )));
        };
        self.ingest(&text, source_name).await
    }

    /// Answer one chat message. `model` falls back to the configured default.
    pub async fn chat(
        &self,
        message: &str,
        session_id: Option<String>,
        model: Option<&str>,
    ) -> ChatOutcome {
        let model = model
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(&self.default_model);
        self.workflow.process_message(message, session_id, model).await
    }

    /// Number of indexed fragments
    pub async fn document_count(&self) -> usize {
        self.index.size().await
    }

    pub async fn clear_all(&self) {
        self.index.clear().await;
    }

    pub async fn stats(&self) -> IndexStats {
        self.index.stats().await
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn available_models(&self) -> &[String] {
        &self.available_models
    }

    pub const fn index(&self) -> &Arc<VectorIndex> {
        &self.index
    }
}
