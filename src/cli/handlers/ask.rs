//! One-shot question answering over local files

use std::path::PathBuf;

use tracing::info;

use super::read_document;
use super::source_name;
use crate::cli::output::*;
use crate::rag::RagService;
use crate::AppConfig;
use crate::Result;

pub async fn handle_ask(
    config: &AppConfig,
    question: &str,
    files: &[PathBuf],
    model: Option<&str>,
    session: Option<String>,
    json: bool,
) -> Result<()> {
    let service = RagService::new(config)?;

    for path in files {
        let text = read_document(path).await?;
        let name = source_name(path);
        let total = service.ingest(&text, &name).await?;
        info!("Indexed {} ({} fragments in index)", name, total);
        if !json {
            print_success(&format!("Indexed {name}"));
        }
    }

    if !json {
        print_index_stats(&service.stats().await);
        println!();
        print_info(&format!(
            "Asking {}...",
            model.unwrap_or(service.default_model())
        ));
        println!();
    }

    let outcome = service.chat(question, session, model).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        if outcome.sources.is_empty() {
            print_warning("No indexed passage matched the question");
        }
        print_chat_outcome(&outcome);
    }

    Ok(())
}
