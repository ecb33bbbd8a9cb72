//! CLI command handlers module
//!
//! This module is organized by functional domains:
//! - ask: One-shot question answering over local files
//! - chunk: Chunking preview
//! - serve: API server
//! - info: Information display (config)

pub mod ask;
pub mod chunk;
pub mod info;
pub mod serve;

use std::path::Path;

// Re-export all public handlers
pub use ask::*;
pub use chunk::*;
pub use info::*;
pub use serve::*;

use crate::errors::PdfRagError;
use crate::extract::is_pdf_filename;
use crate::extract::PdfExtractor;
use crate::extract::PlainTextExtractor;
use crate::extract::TextExtractor;
use crate::Result;

/// Name a file is indexed under: its file name, or the full path as given
pub(crate) fn source_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

/// Read a local file as text: PDFs through the PDF extractor, anything else as UTF-8
pub(crate) async fn read_document(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path).await?;
    let name = source_name(path);

    let text = if is_pdf_filename(&name) {
        PdfExtractor::new().extract(&bytes).await?
    } else {
        PlainTextExtractor.extract(&bytes).await?
    };

    text.ok_or_else(|| PdfRagError::Extraction(format!("no text found in {}", path.display())))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_source_name() {
        assert_eq!(source_name(Path::new("/tmp/docs/report.pdf")), "report.pdf");
        assert_eq!(source_name(Path::new("notes.txt")), "notes.txt");
    }

    #[tokio::test]
    async fn test_read_plain_text_document() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(file, "  The sky is blue.").unwrap();

        let text = read_document(file.path()).await.unwrap();
        assert_eq!(text, "The sky is blue.");
    }

    #[tokio::test]
    async fn test_read_blank_document_fails() {
        let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        let result = read_document(file.path()).await;
        assert!(matches!(result, Err(PdfRagError::Extraction(_))));
    }
}
