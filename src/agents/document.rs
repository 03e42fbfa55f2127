//! Document agent: retrieval-augmented generation over the private collection.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::prompts::{Prompts, ERROR_PREFIX};
use super::preview;
use crate::documents::DocumentRetriever;
use crate::error::GraphError;
use crate::graph::{Node, NodeId};
use crate::llm::LanguageModelClient;
use crate::state::{SharedState, StateUpdate};

pub struct DocumentAgent {
    retriever: Arc<dyn DocumentRetriever>,
    llm: Arc<dyn LanguageModelClient>,
    top_k: usize,
}

impl DocumentAgent {
    pub fn new(
        retriever: Arc<dyn DocumentRetriever>,
        llm: Arc<dyn LanguageModelClient>,
        top_k: usize,
    ) -> Self {
        Self {
            retriever,
            llm,
            top_k,
        }
    }

    /// Answer from the top-k chunks; failures come back as `"Error: ..."` text.
    pub async fn answer(&self, question: &str) -> String {
        match self.try_answer(question).await {
            Ok(answer) => {
                debug!(answer = %preview(&answer), "DocumentAgent answer");
                answer
            }
            Err(message) => {
                warn!(error = %message, "DocumentAgent failed");
                format!("{ERROR_PREFIX} {message}")
            }
        }
    }

    async fn try_answer(&self, question: &str) -> Result<String, String> {
        let chunks = self
            .retriever
            .query(question, self.top_k)
            .await
            .map_err(|e| e.to_string())?;
        info!(retrieved = chunks.len(), "Retrieved document context");

        let context = chunks.join("\n\n");
        self.llm
            .complete(&Prompts::rag(&context, question))
            .await
            .map_err(|e| e.to_string())
    }
}

#[async_trait]
impl Node for DocumentAgent {
    fn id(&self) -> NodeId {
        NodeId::DocumentAgent
    }

    async fn execute(&self, state: &SharedState) -> Result<StateUpdate, GraphError> {
        Ok(StateUpdate::doc_answer(self.answer(&state.question).await))
    }
}
