//! Question answering over uploaded PDF documents
//!
//! Documents are split into overlapping fragments ([`chunker`]), embedded and
//! kept in a process-wide in-memory [`index`]. Chat turns run through the
//! [`rag`] workflow, which retrieves the closest fragments and asks a
//! language model ([`llm`]) to answer from them. [`api`] serves this over
//! HTTP; [`cli`] drives it from the command line.

pub mod api;
pub mod chunker;
pub mod cli;
pub mod config;
pub mod embeddings;
pub mod errors;
pub mod extract;
pub mod index;
pub mod llm;
pub mod logging;
pub mod models;
pub mod rag;


pub use config::AppConfig;
pub use errors::*;
pub use index::VectorIndex;
pub use rag::ChatOutcome;
pub use rag::RagService;
