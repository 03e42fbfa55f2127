//! # Configuration Module
//!
//! Loads and validates configuration from environment variables (and an
//! optional `.env` file). Every external service the engine talks to is
//! described here, so clients can be built once at startup and shared.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

// =============================================================================
// CONFIGURATION STRUCT
// =============================================================================
/// Main configuration for the query engine.
///
/// # Rust Concept: Derive Macros
/// - Debug: Allows printing with {:?} format
/// - Clone: Each adapter can take its own copy of the settings it needs
#[derive(Debug, Clone)]
pub struct Config {
    /// The Ollama model used for routing, RAG answers, and synthesis
    pub model: String,

    /// Ollama server URL (default: http://localhost:11434)
    pub ollama_host: String,

    /// Temperature for LLM responses (0.0 = deterministic, 2.0 = very creative)
    pub temperature: f64,

    /// Which embedder turns documents and queries into vectors
    pub embedding_backend: EmbeddingBackend,

    /// Ollama model used to embed documents and queries
    pub embedding_model: String,

    /// Tavily API key; web search is unavailable without it
    pub tavily_api_key: Option<String>,

    /// Tavily API base URL
    pub tavily_base_url: String,

    /// JSONL file holding the embedded document chunks
    pub store_path: PathBuf,

    /// Number of chunks the document agent retrieves per question
    pub doc_top_k: usize,

    /// Maximum number of web search results the web agent requests
    pub web_max_results: usize,

    /// Per-call timeout for every outbound request, in seconds
    pub request_timeout_secs: u64,

    /// Detect the "Error:" prefix before synthesis instead of leaving it to the LLM
    pub strict_error_detection: bool,

    /// Address the HTTP server binds to
    pub listen_addr: String,
}

/// Embedding provider for the document store.
///
/// Documents and queries must be embedded by the same backend, so switching
/// backends means re-ingesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingBackend {
    /// Ollama's `/api/embed` endpoint with `embedding_model`
    Ollama,
    /// Local hashed bag-of-words, no service needed
    Hash,
}

impl FromStr for EmbeddingBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "hash" => Ok(Self::Hash),
            other => anyhow::bail!("EMBEDDING_BACKEND must be 'ollama' or 'hash', got: {other}"),
        }
    }
}

// =============================================================================
// DEFAULT IMPLEMENTATION
// =============================================================================
impl Default for Config {
    fn default() -> Self {
        Self {
            model: "llama3.2".to_string(),
            ollama_host: "http://localhost:11434".to_string(),
            temperature: 0.7,
            embedding_backend: EmbeddingBackend::Ollama,
            embedding_model: "all-minilm".to_string(),
            tavily_api_key: None,
            tavily_base_url: "https://api.tavily.com".to_string(),
            store_path: PathBuf::from("./db/documents.jsonl"),
            // Top 2 chunks keep the RAG prompt short
            doc_top_k: 2,
            web_max_results: 3,
            request_timeout_secs: 60,
            strict_error_detection: true,
            listen_addr: "127.0.0.1:8000".to_string(),
        }
    }
}

// =============================================================================
// CONFIGURATION LOADING
// =============================================================================
impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is read first if it exists.
    ///
    /// # Rust Concept: The ? Operator
    ///
    /// `.context(...)?` attaches a readable message to a parse failure and
    /// returns early, so a typo in `.env` fails at startup, not mid-request.
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (silently ignore if not found)
        let _ = dotenvy::dotenv();

        let mut config = Config::default();

        if let Ok(val) = env::var("OLLAMA_MODEL") {
            config.model = val;
        }

        if let Ok(val) = env::var("OLLAMA_API_BASE_URL") {
            config.ollama_host = val;
        }

        if let Ok(val) = env::var("TEMPERATURE") {
            config.temperature = val
                .parse()
                .context("TEMPERATURE must be a valid floating-point number (e.g., 0.7)")?;
        }

        if let Ok(val) = env::var("EMBEDDING_BACKEND") {
            config.embedding_backend = val.parse()?;
        }

        if let Ok(val) = env::var("EMBEDDING_MODEL") {
            config.embedding_model = val;
        }

        if let Ok(val) = env::var("TAVILY_API_KEY") {
            if !val.trim().is_empty() {
                config.tavily_api_key = Some(val);
            }
        }

        if let Ok(val) = env::var("TAVILY_BASE_URL") {
            config.tavily_base_url = val;
        }

        if let Ok(val) = env::var("DOCUMENT_STORE") {
            config.store_path = PathBuf::from(val);
        }

        if let Ok(val) = env::var("DOC_TOP_K") {
            config.doc_top_k = val
                .parse()
                .context("DOC_TOP_K must be a valid positive integer")?;
        }

        if let Ok(val) = env::var("MAX_SEARCH_RESULTS") {
            config.web_max_results = val
                .parse()
                .context("MAX_SEARCH_RESULTS must be a valid positive integer")?;
        }

        if let Ok(val) = env::var("REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = val
                .parse()
                .context("REQUEST_TIMEOUT_SECS must be a valid positive integer")?;
        }

        if let Ok(val) = env::var("STRICT_ERROR_DETECTION") {
            config.strict_error_detection = parse_bool(&val)
                .context("STRICT_ERROR_DETECTION must be true or false")?;
        }

        if let Ok(val) = env::var("LISTEN_ADDR") {
            config.listen_addr = val;
        }

        Ok(config)
    }

    /// Validate the configuration before any client is built.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.temperature) {
            anyhow::bail!(
                "Temperature must be between 0.0 and 2.0, got: {}",
                self.temperature
            );
        }

        if self.model.is_empty() {
            anyhow::bail!("OLLAMA_MODEL cannot be empty");
        }

        if self.embedding_model.is_empty() {
            anyhow::bail!("EMBEDDING_MODEL cannot be empty");
        }

        if self.doc_top_k == 0 {
            anyhow::bail!("DOC_TOP_K must be at least 1");
        }

        if self.web_max_results == 0 {
            anyhow::bail!("MAX_SEARCH_RESULTS must be at least 1");
        }

        if self.request_timeout_secs == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECS must be at least 1");
        }

        Ok(())
    }

    /// The per-call timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_bool(val: &str) -> Result<bool> {
    match val.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("not a boolean: {other}"),
    }
}
