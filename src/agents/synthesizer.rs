//! Synthesizer: turn raw agent output into the final answer.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use super::prompts::{Prompts, APOLOGY, ERROR_PREFIX, NO_DATA};
use crate::error::{GenerationError, GraphError};
use crate::graph::{Node, NodeId};
use crate::llm::LanguageModelClient;
use crate::state::{SharedState, StateUpdate};

pub struct SynthesizerAgent {
    llm: Arc<dyn LanguageModelClient>,
    strict_error_detection: bool,
}

impl SynthesizerAgent {
    /// With `strict_error_detection`, raw data starting with `"Error:"` is
    /// answered with the apology directly instead of going through the model.
    pub fn new(llm: Arc<dyn LanguageModelClient>, strict_error_detection: bool) -> Self {
        Self {
            llm,
            strict_error_detection,
        }
    }

    pub async fn synthesize(&self, state: &SharedState) -> Result<String, GenerationError> {
        let agent_data = state.agent_data().unwrap_or(NO_DATA);

        if self.strict_error_detection && agent_data.starts_with(ERROR_PREFIX) {
            warn!(agent_data = %agent_data, "Upstream agent reported an error, skipping synthesis");
            return Ok(APOLOGY.to_string());
        }

        let answer = self
            .llm
            .complete(&Prompts::synthesizer(&state.question, agent_data))
            .await?;
        info!(final_answer = %answer, "Final answer");
        Ok(answer)
    }
}

#[async_trait]
impl Node for SynthesizerAgent {
    fn id(&self) -> NodeId {
        NodeId::Synthesizer
    }

    async fn execute(&self, state: &SharedState) -> Result<StateUpdate, GraphError> {
        Ok(StateUpdate::final_answer(self.synthesize(state).await?))
    }
}
