use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::errors::PdfRagError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_true")]
    pub enable_cors: bool,
    /// Largest accepted upload body, in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_true() -> bool {
    true
}

fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            enable_cors: true,
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_true")]
    pub file_output: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: default_log_dir(),
            file_output: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    /// `ollama`, `openai` or `hash`
    #[serde(default = "default_embedding_provider")]
    pub provider: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Only used by the `hash` provider; remote providers report their own dimension
    #[serde(default = "default_hash_dimension")]
    pub dimension: usize,
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,
}

fn default_embedding_provider() -> String {
    "ollama".to_string()
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_hash_dimension() -> usize {
    384
}

fn default_embedding_timeout() -> u64 {
    60
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            endpoint: default_endpoint(),
            model: default_embedding_model(),
            api_key: None,
            dimension: default_hash_dimension(),
            timeout_secs: default_embedding_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// `ollama` or `openai`
    #[serde(default = "default_llm_provider")]
    pub provider: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_llm_model")]
    pub default_model: String,
    #[serde(default = "default_available_models")]
    pub available_models: Vec<String>,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
    /// Replaces the built-in grounding instructions when set
    #[serde(default)]
    pub system_prompt: Option<String>,
}

fn default_llm_provider() -> String {
    "ollama".to_string()
}

fn default_llm_model() -> String {
    "llama2".to_string()
}

fn default_available_models() -> Vec<String> {
    vec![
        "llama2".to_string(),
        "mistral".to_string(),
        "codellama".to_string(),
    ]
}

fn default_llm_timeout() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            endpoint: default_endpoint(),
            api_key: None,
            default_model: default_llm_model(),
            available_models: default_available_models(),
            timeout_secs: default_llm_timeout(),
            system_prompt: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_overlap")]
    pub overlap: usize,
}

pub(crate) fn default_chunk_size() -> usize {
    1000
}

pub(crate) fn default_overlap() -> usize {
    200
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            overlap: default_overlap(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

pub(crate) fn default_top_k() -> usize {
    crate::index::DEFAULT_SEARCH_K
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default config file path
    pub fn load() -> crate::Result<Self> {
        // Try to load from config.toml first, then fall back to config.example.toml
        if Path::new("config.toml").exists() {
            Self::from_file("config.toml")
        } else if Path::new("config.example.toml").exists() {
            tracing::warn!(
                "Using config.example.toml. Please create config.toml for production use."
            );
            Self::from_file("config.example.toml")
        } else {
            Err(PdfRagError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "No config file found. Please create config.toml or config.example.toml",
            )))
        }
    }

    /// Check cross-field constraints that serde cannot express
    pub fn validate(&self) -> crate::Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(PdfRagError::Config(
                "chunking.chunk_size must be greater than 0".to_string(),
            ));
        }
        if self.chunking.overlap >= self.chunking.chunk_size {
            return Err(PdfRagError::Config(format!(
                "chunking.overlap ({}) must be smaller than chunking.chunk_size ({})",
                self.chunking.overlap, self.chunking.chunk_size
            )));
        }
        if self.retrieval.top_k == 0 {
            return Err(PdfRagError::Config(
                "retrieval.top_k must be greater than 0".to_string(),
            ));
        }
        if self.embeddings.timeout_secs == 0 {
            return Err(PdfRagError::Config(
                "embeddings.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.llm.timeout_secs == 0 {
            return Err(PdfRagError::Config(
                "llm.timeout_secs must be greater than 0".to_string(),
            ));
        }

        match self.embeddings.provider.as_str() {
            "hash" => {
                if self.embeddings.dimension == 0 {
                    return Err(PdfRagError::Config(
                        "embeddings.dimension must be greater than 0".to_string(),
                    ));
                }
            }
            "ollama" | "openai" => {
                check_endpoint("embeddings.endpoint", &self.embeddings.endpoint)?;
            }
            other => {
                return Err(PdfRagError::Config(format!(
                    "unknown embeddings.provider: {other}"
                )))
            }
        }
        if self.embeddings.provider == "openai" && self.embeddings.api_key.is_none() {
            return Err(PdfRagError::Config(
                "embeddings.api_key is required for the openai provider".to_string(),
            ));
        }

        match self.llm.provider.as_str() {
            "ollama" | "openai" => check_endpoint("llm.endpoint", &self.llm.endpoint)?,
            other => {
                return Err(PdfRagError::Config(format!(
                    "unknown llm.provider: {other}"
                )))
            }
        }
        if self.llm.provider == "openai" && self.llm.api_key.is_none() {
            return Err(PdfRagError::Config(
                "llm.api_key is required for the openai provider".to_string(),
            ));
        }

        Ok(())
    }

    /// Get server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Get chunk size in characters
    pub fn chunk_size(&self) -> usize {
        self.chunking.chunk_size
    }

    /// Get chunk overlap in characters
    pub fn chunk_overlap(&self) -> usize {
        self.chunking.overlap
    }

    /// Get number of fragments retrieved per query
    pub fn top_k(&self) -> usize {
        self.retrieval.top_k
    }

    /// Get default generation model
    pub fn default_model(&self) -> &str {
        &self.llm.default_model
    }

    /// Get models offered to clients
    pub fn available_models(&self) -> &[String] {
        &self.llm.available_models
    }

    /// Get embedding model name
    pub fn embedding_model(&self) -> &str {
        &self.embeddings.model
    }
}

fn check_endpoint(field: &str, endpoint: &str) -> crate::Result<()> {
    url::Url::parse(endpoint)
        .map(|_| ())
        .map_err(|e| PdfRagError::Config(format!("{field} is not a valid URL ({endpoint}): {e}")))
}
