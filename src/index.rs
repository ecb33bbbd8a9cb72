//! In-memory vector index over embedded document fragments
//!
//! The index is shared process-wide. Inserts are serialized by a write gate
//! and embed their whole batch before touching the state, then commit it in a
//! single write-locked append: a reader sees either none or all of a batch.
//! Searches embed the query without holding any lock.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::sync::RwLock;
use tracing::debug;
use tracing::info;

use crate::embeddings::Embedder;
use crate::errors::PdfRagError;
use crate::errors::Result;
use crate::models::EmbeddedFragment;
use crate::models::Fragment;
use crate::models::IndexStats;
use crate::models::SearchHit;
use crate::models::SourceSummary;

/// Default number of hits a retrieval asks the index for
pub const DEFAULT_SEARCH_K: usize = 4;

/// Index contents. Emptiness is a variant, not a null handle.
#[derive(Debug, Default)]
enum IndexState {
    #[default]
    Empty,
    Populated {
        /// Fixed by the first committed batch
        dimension: usize,
        entries: Vec<EmbeddedFragment>,
    },
}

impl IndexState {
    fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Populated { entries, .. } => entries.len(),
        }
    }

    fn dimension(&self) -> Option<usize> {
        match self {
            Self::Empty => None,
            Self::Populated { dimension, .. } => Some(*dimension),
        }
    }
}

pub struct VectorIndex {
    embedder: Arc<dyn Embedder>,
    state: RwLock<IndexState>,
    write_gate: Mutex<()>,
}

impl VectorIndex {
    #[must_use]
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            state: RwLock::new(IndexState::Empty),
            write_gate: Mutex::new(()),
        }
    }

    /// Embed and append a batch of fragments, all-or-nothing.
    ///
    /// The first batch into an empty index fixes the embedding dimension.
    /// Returns the index size after the commit.
    ///
    /// # Errors
    /// - `Embedding` if the provider fails for any fragment
    /// - `DimensionMismatch` if the vectors disagree with each other or with the index
    pub async fn insert(&self, fragments: Vec<Fragment>) -> Result<usize> {
        if fragments.is_empty() {
            return Ok(self.size().await);
        }

        let _writer = self.write_gate.lock().await;

        let texts: Vec<&str> = fragments.iter().map(|f| f.text.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != fragments.len() {
            return Err(PdfRagError::Embedding(format!(
                "provider returned {} embeddings for {} fragments",
                embeddings.len(),
                fragments.len()
            )));
        }

        let batch_dimension = embeddings[0].len();
        if batch_dimension == 0 {
            return Err(PdfRagError::Embedding(
                "provider returned an empty embedding".to_string(),
            ));
        }
        if let Some(bad) = embeddings.iter().find(|e| e.len() != batch_dimension) {
            return Err(PdfRagError::DimensionMismatch {
                expected: batch_dimension,
                actual: bad.len(),
            });
        }

        let mut batch: Vec<EmbeddedFragment> = fragments
            .into_iter()
            .zip(embeddings)
            .map(|(fragment, embedding)| EmbeddedFragment::new(fragment, embedding))
            .collect();
        let added = batch.len();

        let mut state = self.state.write().await;
        match state.dimension() {
            None => {
                info!(
                    "Building vector index: {} fragments, dimension {}",
                    added, batch_dimension
                );
                *state = IndexState::Populated {
                    dimension: batch_dimension,
                    entries: batch,
                };
            }
            Some(dimension) if dimension != batch_dimension => {
                return Err(PdfRagError::DimensionMismatch {
                    expected: dimension,
                    actual: batch_dimension,
                });
            }
            Some(_) => {
                if let IndexState::Populated { entries, .. } = &mut *state {
                    // Re-ingesting a source continues its numbering
                    let offsets = next_chunk_offsets(entries, &batch);
                    for fragment in &mut batch {
                        if let Some(offset) = offsets.get(fragment.metadata().source.as_str()) {
                            fragment.offset_chunk_index(*offset);
                        }
                    }
                    entries.extend(batch);
                }
                debug!("Added {} fragments to vector index", added);
            }
        }

        Ok(state.len())
    }

    /// Rank indexed fragments by cosine similarity to `query`.
    ///
    /// Blank queries, `k == 0` and an empty index all yield no hits without
    /// calling the embedding provider. Equal scores keep insertion order.
    ///
    /// # Errors
    /// - `Embedding` if the provider fails on the query
    /// - `DimensionMismatch` if the query vector has the wrong length
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        if query.trim().is_empty() || k == 0 || self.is_empty().await {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;

        let state = self.state.read().await;
        let IndexState::Populated { dimension, entries } = &*state else {
            // Cleared while the query was being embedded
            return Ok(Vec::new());
        };

        if query_embedding.len() != *dimension {
            return Err(PdfRagError::DimensionMismatch {
                expected: *dimension,
                actual: query_embedding.len(),
            });
        }

        let mut scored: Vec<(f32, &EmbeddedFragment)> = entries
            .iter()
            .map(|entry| (cosine_similarity(&query_embedding, entry.embedding()), entry))
            .collect();

        // sort_by is stable, so ties stay in insertion order
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(k);

        debug!(
            "Vector search returned {} of {} fragments",
            scored.len(),
            entries.len()
        );

        Ok(scored
            .into_iter()
            .map(|(score, entry)| SearchHit {
                text: entry.text().to_string(),
                metadata: entry.metadata().clone(),
                score,
            })
            .collect())
    }

    /// Number of embedded fragments
    pub async fn size(&self) -> usize {
        self.state.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        matches!(*self.state.read().await, IndexState::Empty)
    }

    /// Drop every entry. Clearing an empty index is a no-op.
    pub async fn clear(&self) {
        let _writer = self.write_gate.lock().await;
        let mut state = self.state.write().await;
        let dropped = state.len();
        *state = IndexState::Empty;
        if dropped > 0 {
            info!("Cleared vector index ({} fragments)", dropped);
        }
    }

    pub async fn stats(&self) -> IndexStats {
        let state = self.state.read().await;
        let mut per_source: BTreeMap<&str, usize> = BTreeMap::new();
        if let IndexState::Populated { entries, .. } = &*state {
            for entry in entries {
                *per_source.entry(entry.metadata().source.as_str()).or_default() += 1;
            }
        }

        IndexStats {
            fragments: state.len(),
            dimension: state.dimension(),
            sources: per_source
                .into_iter()
                .map(|(source, fragments)| SourceSummary {
                    source: source.to_string(),
                    fragments,
                })
                .collect(),
        }
    }
}

/// First free chunk index for every source of `batch` already present in `entries`
fn next_chunk_offsets<'a>(
    entries: &'a [EmbeddedFragment],
    batch: &[EmbeddedFragment],
) -> HashMap<&'a str, usize> {
    let incoming: HashSet<&str> = batch.iter().map(|f| f.metadata().source.as_str()).collect();
    let mut offsets: HashMap<&'a str, usize> = HashMap::new();
    for entry in entries {
        let source = entry.metadata().source.as_str();
        if incoming.contains(source) {
            let next = entry.metadata().chunk_index + 1;
            let slot = offsets.entry(source).or_default();
            *slot = (*slot).max(next);
        }
    }
    offsets
}

/// Computes cosine similarity between two vectors.
///
/// Zero vectors and vectors that overflow (non-finite result) score 0.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let similarity = dot / (norm_a * norm_b);
    if similarity.is_finite() {
        similarity
    } else {
        0.0
    }
}
