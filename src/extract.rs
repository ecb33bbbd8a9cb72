//! Document text extraction

use async_trait::async_trait;
use tracing::debug;
use tracing::warn;

use crate::errors::PdfRagError;
use crate::errors::Result;

/// Turns uploaded file bytes into raw text.
///
/// `Ok(None)` means the document parsed but holds no extractable text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, bytes: &[u8]) -> Result<Option<String>>;
}

/// PDF extraction backed by the `pdf-extract` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TextExtractor for PdfExtractor {
    async fn extract(&self, bytes: &[u8]) -> Result<Option<String>> {
        if bytes.is_empty() {
            return Ok(None);
        }

        let owned = bytes.to_vec();
        // pdf-extract is CPU-bound and panics on some malformed files
        let text = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&owned).map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| {
            warn!("PDF extraction aborted: {}", e);
            PdfRagError::Extraction(format!("PDF parser aborted: {e}"))
        })?
        .map_err(PdfRagError::Extraction)?;

        debug!("Extracted {} chars from {} PDF bytes", text.len(), bytes.len());
        Ok(normalize_extracted(&text))
    }
}

/// Plain UTF-8 text files, for the CLI
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, bytes: &[u8]) -> Result<Option<String>> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| PdfRagError::Extraction(format!("file is not valid UTF-8: {e}")))?;
        Ok(normalize_extracted(text))
    }
}

/// Trim the extracted text; blank text counts as nothing extracted
pub fn normalize_extracted(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Whether an upload name looks like a PDF
pub fn is_pdf_filename(name: &str) -> bool {
    std::path::Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}
