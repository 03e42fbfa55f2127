//! Scripted collaborators shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use multi_agent_qa::{
    AgentGraph, DocumentRetriever, GenerationError, GraphSettings, LanguageModelClient,
    RetrievalError, SearchError, SearchHit, WebSearchClient,
};

/// A model that answers by prompt kind: the router prompt gets `route_reply`,
/// the RAG prompt gets a fixed answer, the synthesizer prompt gets a summary
/// that quotes the raw data (or the apology when the data is an error).
pub struct ScriptedModel {
    pub route_reply: Result<String, GenerationError>,
    pub fail_synthesis: bool,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn routing(reply: &str) -> Self {
        Self {
            route_reply: Ok(reply.to_string()),
            fail_synthesis: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl LanguageModelClient for ScriptedModel {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        if prompt.contains("You are an expert router") {
            return self.route_reply.clone();
        }
        if prompt.contains("You are an expert answer synthesizer") {
            if self.fail_synthesis {
                return Err(GenerationError::Provider("synthesis unavailable".to_string()));
            }
            let raw = prompt
                .split("The agent found this raw data:\n")
                .nth(1)
                .and_then(|rest| rest.split("\n\nBased on the raw data").next())
                .unwrap_or_default();
            if raw.starts_with("Error:") {
                return Ok(multi_agent_qa::APOLOGY.to_string());
            }
            return Ok(format!("Synthesized: {raw}"));
        }
        Ok("A stakeholder is anyone with an interest in the project.".to_string())
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Records every query; optionally fails with a fixed message.
#[derive(Default)]
pub struct MockRetriever {
    pub calls: Mutex<Vec<(String, usize)>>,
    pub failure: Option<String>,
}

impl MockRetriever {
    pub fn failing(message: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failure: Some(message.to_string()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl DocumentRetriever for MockRetriever {
    async fn query(&self, text: &str, k: usize) -> Result<Vec<String>, RetrievalError> {
        self.calls.lock().unwrap().push((text.to_string(), k));
        match &self.failure {
            Some(message) => Err(RetrievalError::Store(message.clone())),
            None => Ok(vec![
                "Stakeholders are individuals affected by the project.".to_string(),
                "Stakeholder analysis identifies their influence.".to_string(),
            ]
            .into_iter()
            .take(k)
            .collect()),
        }
    }
}

/// Records every search and returns canned snippets.
#[derive(Default)]
pub struct MockSearch {
    pub calls: Mutex<Vec<(String, usize)>>,
    pub count: AtomicUsize,
}

impl MockSearch {
    pub fn call_count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WebSearchClient for MockSearch {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.calls
            .lock()
            .unwrap()
            .push((query.to_string(), max_results));
        Ok(["Kohli has 14,000+ ODI runs.", "He debuted in 2008.", "He bats right-handed.", "extra"]
            .iter()
            .take(max_results)
            .map(|s| SearchHit::from_content(*s))
            .collect())
    }
}

pub struct Harness {
    pub model: Arc<ScriptedModel>,
    pub retriever: Arc<MockRetriever>,
    pub search: Arc<MockSearch>,
    pub graph: AgentGraph,
}

impl Harness {
    pub fn new(model: ScriptedModel, retriever: MockRetriever, settings: GraphSettings) -> Self {
        let model = Arc::new(model);
        let retriever = Arc::new(retriever);
        let search = Arc::new(MockSearch::default());
        let graph = AgentGraph::new(
            model.clone(),
            retriever.clone(),
            search.clone(),
            settings,
        );
        Self {
            model,
            retriever,
            search,
            graph,
        }
    }

    pub fn routing(reply: &str) -> Self {
        Self::new(
            ScriptedModel::routing(reply),
            MockRetriever::default(),
            GraphSettings::default(),
        )
    }
}
