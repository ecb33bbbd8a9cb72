use clap::Parser;
use pdfrag::cli::handle_ask;
use pdfrag::cli::handle_chunk;
use pdfrag::cli::handle_config_command;
use pdfrag::cli::handle_serve_api;
use pdfrag::cli::Cli;
use pdfrag::cli::Commands;
use pdfrag::config::AppConfig;
use pdfrag::Result;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::load()?,
    };

    // Initialize logging
    if cli.verbose {
        pdfrag::logging::init_logging_with_level("debug")?;
    } else {
        pdfrag::logging::init_logging_with_config(&config.logging)?;
    }
    info!("Configuration loaded successfully");

    // Execute the requested command
    match cli.command {
        Commands::Serve {
            host,
            port,
            no_cors,
        } => {
            handle_serve_api(&config, host, port, no_cors).await?;
        }
        Commands::Ask {
            question,
            files,
            model,
            session,
            json,
        } => {
            handle_ask(&config, &question, &files, model.as_deref(), session, json).await?;
        }
        Commands::Chunk {
            file,
            chunk_size,
            overlap,
        } => {
            handle_chunk(&config, &file, chunk_size, overlap).await?;
        }
        Commands::Config => {
            handle_config_command(&config)?;
        }
    }

    Ok(())
}
