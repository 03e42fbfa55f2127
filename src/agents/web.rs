//! Web search agent: raw snippets, no generation step.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use super::preview;
use super::prompts::ERROR_PREFIX;
use crate::error::GraphError;
use crate::graph::{Node, NodeId};
use crate::search::WebSearchClient;
use crate::state::{SharedState, StateUpdate};

pub struct WebSearchAgent {
    search: Arc<dyn WebSearchClient>,
    max_results: usize,
}

impl WebSearchAgent {
    pub fn new(search: Arc<dyn WebSearchClient>, max_results: usize) -> Self {
        Self {
            search,
            max_results,
        }
    }

    /// Snippet contents joined by blank lines; failures come back as `"Error: ..."` text.
    pub async fn answer(&self, question: &str) -> String {
        match self.search.search(question, self.max_results).await {
            Ok(hits) => {
                let answer = hits
                    .iter()
                    .map(|hit| hit.content.as_str())
                    .collect::<Vec<_>>()
                    .join("\n\n");
                debug!(answer = %preview(&answer), "WebSearchAgent answer");
                answer
            }
            Err(e) => {
                warn!(error = %e, "WebSearchAgent failed");
                format!("{ERROR_PREFIX} {e}")
            }
        }
    }
}

#[async_trait]
impl Node for WebSearchAgent {
    fn id(&self) -> NodeId {
        NodeId::WebSearchAgent
    }

    async fn execute(&self, state: &SharedState) -> Result<StateUpdate, GraphError> {
        Ok(StateUpdate::web_answer(self.answer(&state.question).await))
    }
}
