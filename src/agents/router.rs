//! Router: classify a question as a document or a web question.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

use super::prompts::Prompts;
use crate::error::{GraphError, RoutingAmbiguous};
use crate::graph::{Node, NodeId};
use crate::llm::LanguageModelClient;
use crate::state::{SharedState, StateUpdate};

/// Which retrieval branch a question takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    DocumentSearch,
    WebSearch,
}

impl Route {
    pub const DOCUMENT_LABEL: &'static str = "document_search";
    pub const WEB_LABEL: &'static str = "web_search";

    /// Map classifier text to a route by substring containment.
    ///
    /// `document_search` is checked first, so text mentioning both labels
    /// takes the document branch.
    pub fn classify(label: &str) -> Result<Route, RoutingAmbiguous> {
        if label.contains(Self::DOCUMENT_LABEL) {
            Ok(Route::DocumentSearch)
        } else if label.contains(Self::WEB_LABEL) {
            Ok(Route::WebSearch)
        } else {
            Err(RoutingAmbiguous {
                label: label.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Route::DocumentSearch => Self::DOCUMENT_LABEL,
            Route::WebSearch => Self::WEB_LABEL,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trim and lowercase raw classifier output.
pub fn normalize_label(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// The routing node.
pub struct RouterAgent {
    llm: Arc<dyn LanguageModelClient>,
}

impl RouterAgent {
    pub fn new(llm: Arc<dyn LanguageModelClient>) -> Self {
        Self { llm }
    }

    /// Ask the model for a label; a failed call routes to web search.
    pub async fn decide(&self, question: &str) -> String {
        match self.llm.complete(&Prompts::router(question)).await {
            Ok(raw) => {
                let label = normalize_label(&raw);
                info!(decision = %label, "Router decision");
                label
            }
            Err(e) => {
                warn!(error = %e, "Router call failed, defaulting to web search");
                Route::WEB_LABEL.to_string()
            }
        }
    }
}

#[async_trait]
impl Node for RouterAgent {
    fn id(&self) -> NodeId {
        NodeId::Router
    }

    async fn execute(&self, state: &SharedState) -> Result<StateUpdate, GraphError> {
        Ok(StateUpdate::route(self.decide(&state.question).await))
    }
}
