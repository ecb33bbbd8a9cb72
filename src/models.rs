//! Core data types shared by the chunking, indexing and retrieval layers

use serde::Deserialize;
use serde::Serialize;

/// A contiguous slice of one document's text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub text: String,
    pub source_name: String,
    pub chunk_index: usize,
}

impl Fragment {
    pub fn new(text: impl Into<String>, source_name: impl Into<String>, chunk_index: usize) -> Self {
        Self {
            text: text.into(),
            source_name: source_name.into(),
            chunk_index,
        }
    }

    /// Provenance attached to the fragment once indexed
    #[must_use]
    pub fn metadata(&self) -> FragmentMetadata {
        FragmentMetadata {
            source: self.source_name.clone(),
            chunk_index: self.chunk_index,
        }
    }
}

/// Provenance of an indexed fragment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FragmentMetadata {
    pub source: String,
    pub chunk_index: usize,
}

/// A fragment together with its embedding. Only the vector index builds these.
#[derive(Debug, Clone)]
pub struct EmbeddedFragment {
    text: String,
    metadata: FragmentMetadata,
    embedding: Vec<f32>,
}

impl EmbeddedFragment {
    pub(crate) fn new(fragment: Fragment, embedding: Vec<f32>) -> Self {
        let metadata = fragment.metadata();
        Self {
            text: fragment.text,
            metadata,
            embedding,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn metadata(&self) -> &FragmentMetadata {
        &self.metadata
    }

    pub fn embedding(&self) -> &[f32] {
        &self.embedding
    }

    pub fn dimension(&self) -> usize {
        self.embedding.len()
    }

    pub(crate) fn offset_chunk_index(&mut self, offset: usize) {
        self.metadata.chunk_index += offset;
    }
}

/// One ranked result of a similarity search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub text: String,
    pub metadata: FragmentMetadata,
    /// Cosine similarity to the query (higher = more similar)
    pub score: f32,
}

/// Attribution returned to chat callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub text: String,
    pub source: String,
    pub chunk_index: usize,
    pub score: f32,
}

impl From<SearchHit> for Source {
    fn from(hit: SearchHit) -> Self {
        Self {
            text: hit.text,
            source: hit.metadata.source,
            chunk_index: hit.metadata.chunk_index,
            score: hit.score,
        }
    }
}

/// Per-document fragment count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSummary {
    pub source: String,
    pub fragments: usize,
}

/// Snapshot of the index contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub fragments: usize,
    pub dimension: Option<usize>,
    pub sources: Vec<SourceSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_metadata() {
        let fragment = Fragment::new("The sky is blue.", "sky.pdf", 0);
        let metadata = fragment.metadata();
        assert_eq!(metadata.source, "sky.pdf");
        assert_eq!(metadata.chunk_index, 0);
    }

    #[test]
    fn test_metadata_serializes_as_map() {
        let metadata = FragmentMetadata {
            source: "report.pdf".to_string(),
            chunk_index: 3,
        };
        let value = serde_json::to_value(&metadata).unwrap();
        assert_eq!(value["source"], "report.pdf");
        assert_eq!(value["chunk_index"], 3);
    }

    #[test]
    fn test_source_from_hit() {
        let hit = SearchHit {
            text: "passage".to_string(),
            metadata: FragmentMetadata {
                source: "a.pdf".to_string(),
                chunk_index: 2,
            },
            score: 0.5,
        };
        let source = Source::from(hit);
        assert_eq!(source.source, "a.pdf");
        assert_eq!(source.chunk_index, 2);
        assert_eq!(source.text, "passage");
    }
}
