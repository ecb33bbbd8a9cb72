use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfRagError {
    #[error("Text extraction failed: {0}")]
    Extraction(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Embedding dimension mismatch: index holds {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Workflow error: {0}")]
    Workflow(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PdfRagError {
    /// Whether the caller supplied something unusable, as opposed to a backend failing.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Extraction(_) | Self::InvalidInput(_))
    }
}

impl From<reqwest::Error> for PdfRagError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PdfRagError>;
