//! The HTTP API served over a real socket.

mod common;

use common::{MockRetriever, MockSearch, ScriptedModel};
use multi_agent_qa::{server, AgentGraph, GraphSettings};
use serde_json::{json, Value};
use std::sync::Arc;

async fn spawn_server(model: ScriptedModel) -> String {
    let graph = Arc::new(AgentGraph::new(
        Arc::new(model),
        Arc::new(MockRetriever::default()),
        Arc::new(MockSearch::default()),
        GraphSettings::default(),
    ));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, server::router(graph)).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_root_greeting() {
    let base = spawn_server(ScriptedModel::routing("web_search")).await;

    let body: Value = reqwest::get(format!("{base}/")).await.unwrap().json().await.unwrap();

    assert_eq!(
        body,
        json!({ "message": "Hello, World! This is the Multi-Agent Engine API." })
    );
}

#[tokio::test]
async fn test_query_returns_answer_and_route() {
    let base = spawn_server(ScriptedModel::routing("document_search")).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/query"))
        .json(&json!({ "prompt": "What is a project stakeholder?" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["route"], "document_search");
    assert_eq!(
        body["response"],
        "Synthesized: A stakeholder is anyone with an interest in the project."
    );
}

#[tokio::test]
async fn test_empty_prompt_is_rejected() {
    let base = spawn_server(ScriptedModel::routing("web_search")).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/query"))
        .json(&json!({ "prompt": "   " }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "error": "prompt must not be empty" }));
}

#[tokio::test]
async fn test_synthesis_failure_is_500() {
    let model = ScriptedModel {
        fail_synthesis: true,
        ..ScriptedModel::routing("web_search")
    };
    let base = spawn_server(model).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/query"))
        .json(&json!({ "prompt": "Who won?" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 500);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("synthesis unavailable"));
}
