//! RAG (Retrieval-Augmented Generation) module
//!
//! This module answers questions about uploaded documents:
//! - Top-k retrieval from the shared vector index
//! - A three-stage conversational workflow (retrieve, generate, finalize)
//! - The [`RagService`] facade used by the HTTP API and the CLI
//!
//! # Examples
//!
//! ```rust,no_run
//! use pdfrag::config::AppConfig;
//! use pdfrag::rag::RagService;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let service = RagService::new(&config)?;
//!
//!     service.ingest("The sky is blue.", "notes.pdf").await?;
//!     let outcome = service.chat("What color is the sky?", None, None).await;
//!     println!("Answer: {}", outcome.response);
//!     println!("Session: {}", outcome.session_id);
//!
//!     Ok(())
//! }
//! ```

pub mod pipeline;
pub mod retriever;
pub mod workflow;

pub use pipeline::RagService;
pub use retriever::Retrieval;
pub use retriever::Retriever;
pub use workflow::ChatOutcome;
pub use workflow::ConversationState;
pub use workflow::RagWorkflow;
pub use workflow::Stage;
