//! CLI output formatting utilities
//!
//! This module provides consistent output formatting for the `pdfrag` CLI

use crate::models::IndexStats;
use crate::rag::ChatOutcome;
use crate::AppConfig;

/// Characters of each source passage shown under an answer
const SOURCE_PREVIEW_CHARS: usize = 120;

/// Safely truncate a string at character boundary (not byte boundary)
///
/// # Arguments
/// * `s` - The string to truncate
/// * `max_chars` - Maximum number of characters (not bytes)
///
/// # Returns
/// Truncated string with "..." suffix if truncated, otherwise the original string
#[must_use]
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

/// One line, for previews of multi-line passages
fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn print_chat_outcome(outcome: &ChatOutcome) {
    println!("💬 Answer:");
    println!("{}", outcome.response);
    println!();

    if outcome.sources.is_empty() {
        println!("📚 Sources: none");
    } else {
        println!("📚 Sources ({}):", outcome.sources.len());
        for (idx, source) in outcome.sources.iter().enumerate() {
            println!(
                "  {}. {} #{} (score: {:.3})",
                idx + 1,
                source.source,
                source.chunk_index,
                source.score
            );
            println!(
                "     {}",
                truncate_str(&single_line(&source.text), SOURCE_PREVIEW_CHARS)
            );
        }
    }
    println!();
    println!("🔑 Session: {}", outcome.session_id);
}

pub fn print_index_stats(stats: &IndexStats) {
    match stats.dimension {
        Some(dimension) => println!(
            "📊 Index: {} fragments, dimension {}",
            stats.fragments, dimension
        ),
        None => println!("📊 Index: empty"),
    }
    for summary in &stats.sources {
        println!("  - {}: {} fragments", summary.source, summary.fragments);
    }
}

pub fn print_chunks(chunks: &[String], chunk_size: usize, overlap: usize) {
    println!(
        "✂️  {} fragments (chunk size {}, overlap {})",
        chunks.len(),
        chunk_size,
        overlap
    );
    for (idx, chunk) in chunks.iter().enumerate() {
        println!();
        println!("[{idx}] {} chars", chunk.chars().count());
        println!("    {}", truncate_str(&single_line(chunk), SOURCE_PREVIEW_CHARS));
    }
}

pub fn print_config(config: &AppConfig) {
    println!("📋 pdfrag Configuration:");
    println!();

    println!("🌐 Server:");
    println!("  Address: {}", config.bind_address());
    println!("  CORS: {}", config.server.enable_cors);
    println!("  Max upload: {} bytes", config.server.max_upload_bytes);
    println!();

    println!("📝 Logging:");
    println!("  Level: {}", config.logging.level);
    println!("  Directory: {}", config.logging.log_dir);
    println!("  File output: {}", config.logging.file_output);
    println!();

    println!("🧠 Embeddings:");
    println!("  Provider: {}", config.embeddings.provider);
    println!("  Endpoint: {}", config.embeddings.endpoint);
    println!("  Model: {}", config.embedding_model());
    println!("  Key: {}", mask_key(config.embeddings.api_key.as_deref()));
    println!();

    println!("🤖 LLM:");
    println!("  Provider: {}", config.llm.provider);
    println!("  Endpoint: {}", config.llm.endpoint);
    println!("  Key: {}", mask_key(config.llm.api_key.as_deref()));
    println!("  Default model: {}", config.default_model());
    println!("  Available models: {}", config.available_models().join(", "));
    println!("  Timeout: {}s", config.llm.timeout_secs);
    println!();

    println!("✂️  Chunking:");
    println!("  Chunk size: {}", config.chunk_size());
    println!("  Overlap: {}", config.chunk_overlap());
    println!();

    println!("🔍 Retrieval:");
    println!("  Top k: {}", config.top_k());
}

/// Show only the last four characters of a secret
fn mask_key(key: Option<&str>) -> String {
    match key {
        None => "(not set)".to_string(),
        Some(key) => {
            let count = key.chars().count();
            if count <= 4 {
                "****".to_string()
            } else {
                let tail: String = key.chars().skip(count - 4).collect();
                format!("****{tail}")
            }
        }
    }
}

pub fn print_info(msg: &str) {
    println!("ℹ️  {msg}");
}

pub fn print_success(msg: &str) {
    println!("✅ {msg}");
}

pub fn print_warning(msg: &str) {
    println!("⚠️  {msg}");
}
