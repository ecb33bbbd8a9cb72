//! Logging configuration for pdfrag

use std::path::Path;

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;

use crate::config::LoggingConfig;
use crate::Result;

const LOG_FILE_PREFIX: &str = "pdfrag.log";

/// Initialize logging from the `[logging]` config section
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<()> {
    // RUST_LOG wins over the config file so operators can raise verbosity ad hoc
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},pdfrag={}", config.level, config.level)));

    install(env_filter, config)?;

    tracing::info!("Logging initialized with level: {}", config.level);
    if config.file_output {
        tracing::info!(
            "Log files will be saved to: {}/{}.YYYY-MM-DD",
            config.log_dir,
            LOG_FILE_PREFIX
        );
    }

    Ok(())
}

/// Initialize logging with custom log level
pub fn init_logging_with_level(level: &str) -> Result<()> {
    let config = LoggingConfig {
        level: level.to_string(),
        ..LoggingConfig::default()
    };
    let env_filter = EnvFilter::new(format!("{level},pdfrag={level}"));

    install(env_filter, &config)?;

    tracing::info!("Logging initialized with level: {}", level);
    Ok(())
}

/// Initialize simple logging for testing
pub fn init_simple_logging() -> Result<()> {
    // try_init: several tests may race to install the global subscriber
    let _ = tracing_subscriber::fmt()
        .with_target(true)
        .with_max_level(tracing::Level::INFO)
        .with_test_writer()
        .try_init();

    Ok(())
}

fn install(env_filter: EnvFilter, config: &LoggingConfig) -> Result<()> {
    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);

    let file_layer = if config.file_output {
        let logs_dir = Path::new(&config.log_dir);
        if !logs_dir.exists() {
            std::fs::create_dir_all(logs_dir)?;
        }

        let file_appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        // The writer thread must outlive every span; keep the guard for the process lifetime
        std::mem::forget(guard);

        Some(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_span_events(FmtSpan::CLOSE)
                .with_writer(non_blocking)
                .with_ansi(false),
        )
    } else {
        None
    };

    Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}
