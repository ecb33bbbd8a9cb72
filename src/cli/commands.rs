//! CLI command definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(name = "pdfrag")]
#[command(about = "Ask questions about PDF documents with retrieval-augmented generation")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: info level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: config.toml, then config.example.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host to bind to (default: from config)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (default: from config)
        #[arg(short, long)]
        port: Option<u16>,
        /// Disable CORS
        #[arg(long)]
        no_cors: bool,
    },
    /// Index documents into a fresh in-memory index and ask one question
    Ask {
        /// The question to ask
        question: String,
        /// PDF or plain-text files to index first
        #[arg(short, long = "file", required = true)]
        files: Vec<PathBuf>,
        /// Model to answer with (default: from config)
        #[arg(short, long)]
        model: Option<String>,
        /// Session id to continue
        #[arg(short, long)]
        session: Option<String>,
        /// Print the raw JSON outcome
        #[arg(long)]
        json: bool,
    },
    /// Show how a document would be split into fragments
    Chunk {
        /// PDF or plain-text file
        file: PathBuf,
        /// Fragment size in characters (default: from config)
        #[arg(long)]
        chunk_size: Option<usize>,
        /// Overlap between fragments in characters (default: from config)
        #[arg(long)]
        overlap: Option<usize>,
    },
    /// Show current configuration
    Config,
}
