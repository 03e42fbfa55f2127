//! # Multi-Agent Query Engine
//!
//! Answers a question from one of two sources:
//! - a private document collection (retrieval-augmented generation), or
//! - a web search,
//!
//! chosen per question by an LLM router, then turns the raw material into a
//! final answer with a synthesizer agent.
//!
//! ## Quick Start
//!
//! ```ignore
//! use multi_agent_qa::{AgentGraph, Config};
//!
//! let config = Config::from_env()?;
//! let graph = AgentGraph::from_config(&config)?;
//! let state = graph.run("What is a project stakeholder?").await?;
//! println!("{}", state.final_answer.unwrap_or_default());
//! ```

pub mod agents;
pub mod config;
pub mod documents;
pub mod error;
pub mod graph;
pub mod llm;
pub mod search;
pub mod server;
pub mod state;

pub use agents::{Route, APOLOGY};
pub use config::{Config, EmbeddingBackend};
pub use documents::{DocumentRetriever, Embedder};
pub use error::{GenerationError, GraphError, RetrievalError, RoutingAmbiguous, SearchError};
pub use graph::{AgentGraph, GraphRun, GraphSettings, Node, NodeId};
pub use llm::LanguageModelClient;
pub use search::{SearchHit, WebSearchClient};
pub use state::{SharedState, StateUpdate};
