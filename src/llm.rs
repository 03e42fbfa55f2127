//! # Language Model Module
//!
//! The [`LanguageModelClient`] seam every LLM-calling node goes through,
//! and its Ollama implementation built on the Rig framework.

use async_trait::async_trait;
use rig::client::{CompletionClient, Nothing};
use rig::completion::Prompt;
use rig::providers::ollama;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::error::GenerationError;

// =============================================================================
// CLIENT TRAIT
// =============================================================================
/// A single prompt-in, text-out completion request.
///
/// # Rust Concept: Trait Objects
///
/// Nodes hold an `Arc<dyn LanguageModelClient>`, so tests can swap in a
/// scripted model without touching the graph. `Send + Sync` lets the same
/// client serve many concurrent runs.
#[async_trait]
pub trait LanguageModelClient: Send + Sync {
    /// Send `prompt` and return the generated text verbatim.
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Model identifier, for logging
    fn model_name(&self) -> &str;
}

// =============================================================================
// OLLAMA IMPLEMENTATION
// =============================================================================
/// Ollama-backed model driven through a Rig agent.
pub struct OllamaModel {
    client: ollama::Client,
    model: String,
    temperature: f64,
    timeout: Duration,
}

impl OllamaModel {
    /// Build the client once from configuration, pointed at `ollama_host`.
    pub fn from_config(config: &Config) -> Result<Self, GenerationError> {
        let client = ollama::Client::builder()
            .api_key(Nothing)
            .base_url(&config.ollama_host)
            .build()
            .map_err(|e| GenerationError::Provider(format!("failed to build Ollama client: {e}")))?;

        debug!(
            host = %config.ollama_host,
            model = %config.model,
            "Ollama client created"
        );

        Ok(Self {
            client,
            model: config.model.clone(),
            temperature: config.temperature,
            timeout: config.request_timeout(),
        })
    }
}

#[async_trait]
impl LanguageModelClient for OllamaModel {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        let agent = self
            .client
            .agent(&self.model)
            .temperature(self.temperature)
            .build();

        debug!(model = %self.model, prompt_len = prompt.len(), "Sending completion request");

        let response = tokio::time::timeout(self.timeout, async { agent.prompt(prompt).await })
            .await
            .map_err(|_| GenerationError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| GenerationError::Provider(e.to_string()))?;

        Ok(response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
