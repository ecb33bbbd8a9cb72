//! Retrieval over the shared vector index

use std::sync::Arc;

use tracing::debug;
use tracing::warn;

use crate::errors::Result;
use crate::index::VectorIndex;
use crate::models::FragmentMetadata;
use crate::models::SearchHit;
use crate::models::Source;

/// Passages selected for one question, best match first.
///
/// `context`, `metadata` and `scores` are parallel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Retrieval {
    pub context: Vec<String>,
    pub metadata: Vec<FragmentMetadata>,
    pub scores: Vec<f32>,
}

impl Retrieval {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.context.is_empty()
    }

    pub fn len(&self) -> usize {
        self.context.len()
    }

    /// Attribution records for the chat response
    #[must_use]
    pub fn sources(&self) -> Vec<Source> {
        self.context
            .iter()
            .zip(&self.metadata)
            .zip(&self.scores)
            .map(|((text, metadata), score)| Source {
                text: text.clone(),
                source: metadata.source.clone(),
                chunk_index: metadata.chunk_index,
                score: *score,
            })
            .collect()
    }
}

impl From<Vec<SearchHit>> for Retrieval {
    fn from(hits: Vec<SearchHit>) -> Self {
        let mut retrieval = Self {
            context: Vec::with_capacity(hits.len()),
            metadata: Vec::with_capacity(hits.len()),
            scores: Vec::with_capacity(hits.len()),
        };
        for hit in hits {
            retrieval.context.push(hit.text);
            retrieval.metadata.push(hit.metadata);
            retrieval.scores.push(hit.score);
        }
        retrieval
    }
}

#[derive(Clone)]
pub struct Retriever {
    index: Arc<VectorIndex>,
}

impl Retriever {
    pub fn new(index: Arc<VectorIndex>) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &Arc<VectorIndex> {
        &self.index
    }

    /// Top-`k` passages for `query`, best match first
    pub async fn try_retrieve(&self, query: &str, k: usize) -> Result<Retrieval> {
        let hits = self.index.search(query, k).await?;
        debug!("Retrieved {} passages", hits.len());
        Ok(Retrieval::from(hits))
    }

    /// Like [`Retriever::try_retrieve`], but a failure yields no passages
    pub async fn retrieve(&self, query: &str, k: usize) -> Retrieval {
        match self.try_retrieve(query, k).await {
            Ok(retrieval) => retrieval,
            Err(e) => {
                warn!("Retrieval failed, continuing without context: {}", e);
                Retrieval::empty()
            }
        }
    }
}
