//! # Graph Module
//!
//! The orchestration state machine:
//!
//! ```text
//!                ┌──────────┐
//!                │  Router  │
//!                └────┬─────┘
//!       document_search│ web_search / anything else
//!          ┌───────────┴───────────┐
//!          ▼                       ▼
//!   ┌──────────────┐       ┌────────────────┐
//!   │DocumentAgent │       │ WebSearchAgent │
//!   └──────┬───────┘       └───────┬────────┘
//!          └───────────┬───────────┘
//!                      ▼
//!               ┌─────────────┐
//!               │ Synthesizer │ ──▶ END
//!               └─────────────┘
//! ```
//!
//! Nodes run one at a time. Each returns a partial update that is folded
//! into a new state value before the next transition is chosen, and every
//! node runs at most once per question.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::agents::{DocumentAgent, Route, RouterAgent, SynthesizerAgent, WebSearchAgent, APOLOGY};
use crate::config::{Config, EmbeddingBackend};
use crate::documents::{DocumentRetriever, Embedder, HashEmbedder, OllamaEmbedder, VectorRetriever};
use crate::error::{GenerationError, GraphError, SearchError};
use crate::llm::{LanguageModelClient, OllamaModel};
use crate::search::{DisabledSearch, TavilyClient, WebSearchClient};
use crate::state::{SharedState, StateUpdate};

// =============================================================================
// NODES
// =============================================================================

/// Identifies a node in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeId {
    Router,
    DocumentAgent,
    WebSearchAgent,
    Synthesizer,
}

impl NodeId {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeId::Router => "Router",
            NodeId::DocumentAgent => "DocumentAgent",
            NodeId::WebSearchAgent => "WebSearchAgent",
            NodeId::Synthesizer => "Synthesizer",
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of the graph.
///
/// # Rust Concept: async_trait
///
/// Async methods in a trait used as `dyn Node` need boxing; the
/// `async_trait` macro does that for us.
#[async_trait]
pub trait Node: Send + Sync {
    fn id(&self) -> NodeId;

    /// Compute this node's update from the current state.
    async fn execute(&self, state: &SharedState) -> Result<StateUpdate, GraphError>;
}

/// The transition table. `None` means the run is over.
///
/// An unrecognized router label takes the web search branch.
pub fn next_node(current: NodeId, state: &SharedState) -> Option<NodeId> {
    match current {
        NodeId::Router => {
            let label = state.route.as_deref().unwrap_or_default();
            let route = match Route::classify(label) {
                Ok(route) => route,
                Err(ambiguous) => {
                    warn!(%ambiguous, "Fallback: defaulting to WebSearchAgent");
                    Route::WebSearch
                }
            };
            Some(match route {
                Route::DocumentSearch => NodeId::DocumentAgent,
                Route::WebSearch => NodeId::WebSearchAgent,
            })
        }
        NodeId::DocumentAgent | NodeId::WebSearchAgent => Some(NodeId::Synthesizer),
        NodeId::Synthesizer => None,
    }
}

// =============================================================================
// SETTINGS
// =============================================================================

/// Tunables the nodes need beyond their clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphSettings {
    /// Chunks retrieved by the document agent
    pub doc_top_k: usize,
    /// Results requested by the web search agent
    pub web_max_results: usize,
    /// Answer `"Error:"` data with the apology without asking the model
    pub strict_error_detection: bool,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            doc_top_k: 2,
            web_max_results: 3,
            strict_error_detection: true,
        }
    }
}

impl From<&Config> for GraphSettings {
    fn from(config: &Config) -> Self {
        Self {
            doc_top_k: config.doc_top_k,
            web_max_results: config.web_max_results,
            strict_error_detection: config.strict_error_detection,
        }
    }
}

// =============================================================================
// GRAPH
// =============================================================================

/// Final state of a run plus the nodes it visited, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphRun {
    pub state: SharedState,
    pub visited: Vec<NodeId>,
}

/// Router → (DocumentAgent | WebSearchAgent) → Synthesizer.
///
/// Holds no per-question data, so one graph behind an `Arc` can serve any
/// number of concurrent questions.
pub struct AgentGraph {
    router: RouterAgent,
    document: DocumentAgent,
    web: WebSearchAgent,
    synthesizer: SynthesizerAgent,
}

impl AgentGraph {
    /// Wire the four nodes to their collaborators.
    pub fn new(
        llm: Arc<dyn LanguageModelClient>,
        retriever: Arc<dyn DocumentRetriever>,
        search: Arc<dyn WebSearchClient>,
        settings: GraphSettings,
    ) -> Self {
        debug!(model = %llm.model_name(), ?settings, "Wiring agent graph");
        Self {
            router: RouterAgent::new(Arc::clone(&llm)),
            document: DocumentAgent::new(retriever, Arc::clone(&llm), settings.doc_top_k),
            web: WebSearchAgent::new(search, settings.web_max_results),
            synthesizer: SynthesizerAgent::new(llm, settings.strict_error_detection),
        }
    }

    /// Build every client once from configuration.
    ///
    /// Without a Tavily key the graph still runs; web questions get the
    /// "not configured" error as their raw answer.
    pub fn from_config(config: &Config) -> Result<Self, GenerationError> {
        let llm: Arc<dyn LanguageModelClient> = Arc::new(OllamaModel::from_config(config)?);
        let retriever: Arc<dyn DocumentRetriever> = Arc::new(VectorRetriever::new(
            config.store_path.clone(),
            embedder_from_config(config),
        ));
        let search: Arc<dyn WebSearchClient> = match TavilyClient::from_config(config) {
            Ok(client) => Arc::new(client),
            Err(e) => {
                warn!(error = %e, "Web search disabled");
                let reason = match e {
                    SearchError::NotConfigured(reason) => reason,
                    other => other.to_string(),
                };
                Arc::new(DisabledSearch::new(reason))
            }
        };

        Ok(Self::new(llm, retriever, search, GraphSettings::from(config)))
    }

    fn node(&self, id: NodeId) -> &dyn Node {
        match id {
            NodeId::Router => &self.router,
            NodeId::DocumentAgent => &self.document,
            NodeId::WebSearchAgent => &self.web,
            NodeId::Synthesizer => &self.synthesizer,
        }
    }

    /// Run the graph for one question and return the final state.
    pub async fn run(&self, question: &str) -> Result<SharedState, GraphError> {
        self.run_traced(question).await.map(|run| run.state)
    }

    /// Like [`AgentGraph::run`], also reporting which nodes executed.
    pub async fn run_traced(&self, question: &str) -> Result<GraphRun, GraphError> {
        info!(question = %question, "Running agent graph");

        let mut state = SharedState::new(question);
        let mut visited = Vec::with_capacity(3);
        let mut current = Some(NodeId::Router);

        while let Some(id) = current {
            let node = self.node(id);
            info!(node = %node.id(), "Executing node");
            let update = node.execute(&state).await?;
            state = state.apply(update);
            visited.push(node.id());
            current = next_node(node.id(), &state);
        }

        info!(path = ?visited, "Graph finished");
        Ok(GraphRun { state, visited })
    }

    /// Run the graph and return only the answer text.
    ///
    /// Any error that stopped the run becomes the fixed apology.
    pub async fn answer(&self, question: &str) -> String {
        match self.run(question).await {
            Ok(state) => state.final_answer.unwrap_or_else(|| APOLOGY.to_string()),
            Err(e) => {
                warn!(error = %e, "Graph run failed");
                APOLOGY.to_string()
            }
        }
    }
}

/// The embedder selected by `EMBEDDING_BACKEND`.
pub fn embedder_from_config(config: &Config) -> Arc<dyn Embedder> {
    match config.embedding_backend {
        EmbeddingBackend::Ollama => Arc::new(OllamaEmbedder::from_config(config)),
        EmbeddingBackend::Hash => Arc::new(HashEmbedder::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routed(label: &str) -> SharedState {
        SharedState::new("q").apply(StateUpdate::route(label))
    }

    #[test]
    fn test_transition_table() {
        assert_eq!(
            next_node(NodeId::Router, &routed("document_search")),
            Some(NodeId::DocumentAgent)
        );
        assert_eq!(
            next_node(NodeId::Router, &routed("web_search")),
            Some(NodeId::WebSearchAgent)
        );
        assert_eq!(
            next_node(NodeId::DocumentAgent, &routed("document_search")),
            Some(NodeId::Synthesizer)
        );
        assert_eq!(
            next_node(NodeId::WebSearchAgent, &routed("web_search")),
            Some(NodeId::Synthesizer)
        );
        assert_eq!(next_node(NodeId::Synthesizer, &routed("web_search")), None);
    }

    #[test]
    fn test_router_fallback_transitions() {
        assert_eq!(
            next_node(NodeId::Router, &routed("unsure")),
            Some(NodeId::WebSearchAgent)
        );
        assert_eq!(
            next_node(NodeId::Router, &SharedState::new("q")),
            Some(NodeId::WebSearchAgent)
        );
    }

    #[test]
    fn test_settings_from_config() {
        let config = Config {
            doc_top_k: 4,
            web_max_results: 5,
            strict_error_detection: false,
            ..Config::default()
        };
        assert_eq!(
            GraphSettings::from(&config),
            GraphSettings {
                doc_top_k: 4,
                web_max_results: 5,
                strict_error_detection: false,
            }
        );
        assert_eq!(GraphSettings::from(&Config::default()), GraphSettings::default());
    }

    #[test]
    fn test_each_slot_holds_its_node() {
        let graph = AgentGraph::from_config(&Config::default()).unwrap();

        for id in [
            NodeId::Router,
            NodeId::DocumentAgent,
            NodeId::WebSearchAgent,
            NodeId::Synthesizer,
        ] {
            assert_eq!(graph.node(id).id(), id);
        }
    }

    #[test]
    fn test_node_id_display() {
        assert_eq!(NodeId::WebSearchAgent.to_string(), "WebSearchAgent");
    }
}
