//! # Server Module
//!
//! A thin HTTP front door for the graph.
//!
//! - `GET /` returns a greeting, handy as a liveness check
//! - `POST /query` takes `{"prompt": "..."}` and answers with
//!   `{"response": "...", "route": "..."}` or `{"error": "..."}`

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::graph::AgentGraph;

/// Request body for `POST /query`
#[derive(Debug, Deserialize)]
pub struct PromptRequest {
    pub prompt: String,
}

/// Response body for `POST /query`
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum QueryResponse {
    Answer {
        response: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        route: Option<String>,
    },
    Failure {
        error: String,
    },
}

/// Build the router; the graph is shared by every request.
pub fn router(graph: Arc<AgentGraph>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/query", post(query))
        .with_state(graph)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(graph: Arc<AgentGraph>, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "HTTP server listening");
    axum::serve(listener, router(graph)).await?;
    Ok(())
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Hello, World! This is the Multi-Agent Engine API."
    }))
}

async fn query(
    State(graph): State<Arc<AgentGraph>>,
    Json(request): Json<PromptRequest>,
) -> (StatusCode, Json<QueryResponse>) {
    info!(prompt = %request.prompt, "Received query");

    if request.prompt.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(QueryResponse::Failure {
                error: "prompt must not be empty".to_string(),
            }),
        );
    }

    match graph.run(&request.prompt).await {
        Ok(state) => (
            StatusCode::OK,
            Json(QueryResponse::Answer {
                response: state.final_answer.unwrap_or_default(),
                route: state.route,
            }),
        ),
        Err(e) => {
            error!(error = %e, "Query failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(QueryResponse::Failure {
                    error: e.to_string(),
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_response_shapes() {
        let ok = QueryResponse::Answer {
            response: "42".to_string(),
            route: None,
        };
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({ "response": "42" })
        );

        let err = QueryResponse::Failure {
            error: "boom".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            serde_json::json!({ "error": "boom" })
        );
    }

    #[test]
    fn test_prompt_request_parses() {
        let req: PromptRequest = serde_json::from_str(r#"{"prompt": "hi"}"#).unwrap();
        assert_eq!(req.prompt, "hi");
    }
}
