//! # Error Module
//!
//! Typed errors for the three external collaborators and for the graph.
//!
//! Collaborator errors are kept separate so each node can decide what to do
//! with them: the retrieval agents turn them into in-band text, the router
//! falls back, and the synthesizer propagates them as a [`GraphError`].

use thiserror::Error;

// =============================================================================
// COLLABORATOR ERRORS
// =============================================================================

/// Failure while asking the language model for a completion.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("completion request failed: {0}")]
    Provider(String),

    #[error("completion timed out after {0}s")]
    Timeout(u64),
}

/// Failure while querying the document collection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RetrievalError {
    /// The backing store has not been created yet (run `ingest` first).
    #[error("document store not initialized at {0}")]
    NotInitialized(String),

    #[error("embedding request failed: {0}")]
    Embedding(String),

    #[error("document store error: {0}")]
    Store(String),
}

/// Failure while querying the web search provider.
///
/// # Rust Concept: Custom Error Types with thiserror
///
/// Each variant maps to one way the provider can fail. Matching on the
/// variant is how callers (and tests) tell a bad API key from a rate limit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("unauthorized - check TAVILY_API_KEY")]
    Unauthorized,

    #[error("rate limited by search provider, please wait")]
    RateLimited,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("server error ({0}): {1}")]
    ServerError(u16, String),

    #[error("HTTP error ({0}): {1}")]
    HttpError(u16, String),

    #[error("failed to parse response: {0}")]
    ParseError(String),

    #[error("search provider not configured: {0}")]
    NotConfigured(String),
}

// =============================================================================
// ROUTING
// =============================================================================

/// The router's classifier text matched neither route label.
///
/// This is never fatal: the graph logs it and falls back to web search.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("router label {label:?} matched no known route")]
pub struct RoutingAmbiguous {
    pub label: String,
}

// =============================================================================
// GRAPH ERRORS
// =============================================================================

/// An error that escaped a node and stopped the run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("synthesizer failed: {0}")]
    Synthesis(#[from] GenerationError),
}
