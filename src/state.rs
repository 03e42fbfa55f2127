//! # State Module
//!
//! The record threaded through one graph run.
//!
//! Nodes never mutate the state. Each returns a [`StateUpdate`] and the graph
//! folds it into a new [`SharedState`] with [`SharedState::apply`], so every
//! intermediate state of a run is a plain value that can be logged or
//! compared.

use serde::{Deserialize, Serialize};

/// Everything known about one question while it moves through the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedState {
    /// The user's question, fixed for the whole run
    pub question: String,

    /// Raw output of the document agent, if it ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_answer: Option<String>,

    /// Raw output of the web search agent, if it ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_answer: Option<String>,

    /// Normalized router label (`document_search`, `web_search`, or anything else)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,

    /// The synthesized answer returned to the caller
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_answer: Option<String>,
}

/// A partial update produced by one node.
///
/// `None` fields leave the state untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateUpdate {
    pub doc_answer: Option<String>,
    pub web_answer: Option<String>,
    pub route: Option<String>,
    pub final_answer: Option<String>,
}

impl StateUpdate {
    pub fn route(route: impl Into<String>) -> Self {
        Self {
            route: Some(route.into()),
            ..Self::default()
        }
    }

    pub fn doc_answer(answer: impl Into<String>) -> Self {
        Self {
            doc_answer: Some(answer.into()),
            ..Self::default()
        }
    }

    pub fn web_answer(answer: impl Into<String>) -> Self {
        Self {
            web_answer: Some(answer.into()),
            ..Self::default()
        }
    }

    pub fn final_answer(answer: impl Into<String>) -> Self {
        Self {
            final_answer: Some(answer.into()),
            ..Self::default()
        }
    }
}

impl SharedState {
    /// Fresh state for a new question.
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Self::default()
        }
    }

    /// Produce the next state from an update.
    ///
    /// `route` and `final_answer` are write-once: a value already present
    /// wins over the update.
    pub fn apply(&self, update: StateUpdate) -> Self {
        Self {
            question: self.question.clone(),
            doc_answer: update.doc_answer.or_else(|| self.doc_answer.clone()),
            web_answer: update.web_answer.or_else(|| self.web_answer.clone()),
            route: self.route.clone().or(update.route),
            final_answer: self.final_answer.clone().or(update.final_answer),
        }
    }

    /// The raw agent output the synthesizer should work from.
    ///
    /// Prefers the document answer. Empty strings count as missing.
    pub fn agent_data(&self) -> Option<&str> {
        self.doc_answer
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.web_answer.as_deref().filter(|s| !s.is_empty()))
    }
}
