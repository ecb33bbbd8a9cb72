//! Chunking preview

use std::path::Path;

use super::read_document;
use crate::chunker::Chunker;
use crate::cli::output::*;
use crate::AppConfig;
use crate::Result;

pub async fn handle_chunk(
    config: &AppConfig,
    file: &Path,
    chunk_size: Option<usize>,
    overlap: Option<usize>,
) -> Result<()> {
    let chunker = Chunker::new(
        chunk_size.unwrap_or_else(|| config.chunk_size()),
        overlap.unwrap_or_else(|| config.chunk_overlap()),
    )?;

    let text = read_document(file).await?;
    print_info(&format!(
        "{}: {} characters",
        file.display(),
        text.chars().count()
    ));

    let chunks = chunker.chunk(&text);
    print_chunks(&chunks, chunker.chunk_size(), chunker.overlap());
    Ok(())
}
