//! Sliding-window text chunking
//!
//! Splits extracted document text into overlapping fixed-size windows ready
//! for embedding. Sizes and offsets count characters, not bytes, so windows
//! never cut a multi-byte character in half.

use crate::config::default_chunk_size;
use crate::config::default_overlap;
use crate::errors::PdfRagError;
use crate::errors::Result;
use crate::models::Fragment;

/// Split `text` into overlapping windows of `chunk_size` characters.
///
/// Each window advances by `chunk_size - overlap`. Windows that are blank
/// after trimming are dropped but still advance the offset. The last window
/// may be shorter than `chunk_size`.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>> {
    validate(chunk_size, overlap)?;

    if text.is_empty() {
        return Ok(Vec::new());
    }

    // Byte offset of every char, plus the end of the string
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(offset, _)| offset)
        .chain(std::iter::once(text.len()))
        .collect();
    let total_chars = boundaries.len() - 1;

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < total_chars {
        let end = (start + chunk_size).min(total_chars);
        let window = text[boundaries[start]..boundaries[end]].trim();

        if !window.is_empty() {
            chunks.push(window.to_string());
        }

        if end < total_chars {
            start = end - overlap;
        } else {
            break;
        }
    }

    Ok(chunks)
}

fn validate(chunk_size: usize, overlap: usize) -> Result<()> {
    if chunk_size == 0 {
        return Err(PdfRagError::InvalidInput(
            "chunk_size must be greater than 0".to_string(),
        ));
    }
    if overlap >= chunk_size {
        return Err(PdfRagError::InvalidInput(format!(
            "overlap ({overlap}) must be smaller than chunk_size ({chunk_size})"
        )));
    }
    Ok(())
}

/// Chunker bound to one chunking policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    chunk_size: usize,
    overlap: usize,
}

impl Chunker {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        validate(chunk_size, overlap)?;
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    pub fn from_config(config: &crate::config::AppConfig) -> Result<Self> {
        Self::new(config.chunk_size(), config.chunk_overlap())
    }

    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    #[must_use]
    pub const fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split text into plain chunk strings
    #[must_use]
    pub fn chunk(&self, text: &str) -> Vec<String> {
        // Parameters were validated at construction
        chunk_text(text, self.chunk_size, self.overlap).unwrap_or_default()
    }

    /// Split a document into fragments numbered in production order
    #[must_use]
    pub fn fragments(&self, text: &str, source_name: &str) -> Vec<Fragment> {
        self.chunk(text)
            .into_iter()
            .enumerate()
            .map(|(index, chunk)| Fragment::new(chunk, source_name, index))
            .collect()
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            overlap: default_overlap(),
        }
    }
}
