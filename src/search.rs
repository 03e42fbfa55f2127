//! # Web Search Module
//!
//! The [`WebSearchClient`] seam used by the web search agent, and a Tavily
//! implementation over plain HTTP.
//!
//! Unlike a research tool, this client never retries: a failed search is
//! reported once and the agent turns it into in-band text.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::SearchError;

// =============================================================================
// SEARCH RESULT STRUCT
// =============================================================================
/// A single web search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Page title
    #[serde(default)]
    pub title: String,

    /// Page URL
    #[serde(default)]
    pub url: String,

    /// Extracted content snippet; the only field the web agent reads
    pub content: String,
}

impl SearchHit {
    /// A hit carrying only content, mostly useful in tests
    pub fn from_content(content: impl Into<String>) -> Self {
        Self {
            title: String::new(),
            url: String::new(),
            content: content.into(),
        }
    }
}

// =============================================================================
// CLIENT TRAIT
// =============================================================================
/// Free-text query against a web search provider.
#[async_trait]
pub trait WebSearchClient: Send + Sync {
    /// Return at most `max_results` hits for `query`.
    async fn search(&self, query: &str, max_results: usize)
        -> Result<Vec<SearchHit>, SearchError>;
}

// =============================================================================
// TAVILY IMPLEMENTATION
// =============================================================================
/// Request body for the Tavily search endpoint
#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    max_results: usize,
    search_depth: &'static str,
    topic: &'static str,
}

/// Response from the Tavily search endpoint
#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

/// Tavily web search over its JSON HTTP API.
///
/// # Example
/// ```ignore
/// let client = TavilyClient::new("tvly-...");
/// let hits = client.search("Virat Kohli ODI runs", 3).await?;
/// ```
#[derive(Debug, Clone)]
pub struct TavilyClient {
    api_key: String,
    base_url: String,
    client: Client,
    timeout: Duration,
}

impl TavilyClient {
    /// Default timeout for Tavily API requests
    const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Create a client against the public Tavily endpoint
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.tavily.com".to_string(),
            client: Client::new(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Build from configuration; fails when no API key is set.
    pub fn from_config(config: &Config) -> Result<Self, SearchError> {
        let api_key = config.tavily_api_key.clone().ok_or_else(|| {
            SearchError::NotConfigured("TAVILY_API_KEY environment variable not set".to_string())
        })?;

        Ok(Self::new(api_key)
            .with_base_url(config.tavily_base_url.clone())
            .with_timeout(config.request_timeout()))
    }

    /// Point the client at another base URL (a proxy or a mock server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set custom timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl WebSearchClient for TavilyClient {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        info!(query = %query, max_results, "Performing web search");

        let request = TavilyRequest {
            query,
            max_results,
            search_depth: "basic",
            topic: "general",
        };

        let url = format!("{}/search", self.base_url);
        debug!(url = %url, "Sending Tavily request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout
                } else {
                    SearchError::Network(e.to_string())
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 => SearchError::Unauthorized,
                429 => SearchError::RateLimited,
                400 => SearchError::BadRequest(error_text),
                code @ 500..=599 => SearchError::ServerError(code, error_text),
                code => SearchError::HttpError(code, error_text),
            });
        }

        let body: TavilyResponse = response
            .json()
            .await
            .map_err(|e| SearchError::ParseError(e.to_string()))?;

        let hits: Vec<SearchHit> = body.results.into_iter().take(max_results).collect();

        if hits.is_empty() {
            warn!(query = %query, "No search results found");
        } else {
            info!(query = %query, count = hits.len(), "Search completed");
        }

        Ok(hits)
    }
}

// =============================================================================
// DISABLED SEARCH
// =============================================================================
/// Stand-in used when no provider is configured.
///
/// Every search fails with [`SearchError::NotConfigured`], which the web agent
/// reports in-band, so document questions keep working without a search key.
#[derive(Debug, Clone)]
pub struct DisabledSearch {
    reason: String,
}

impl DisabledSearch {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl WebSearchClient for DisabledSearch {
    async fn search(
        &self,
        _query: &str,
        _max_results: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        Err(SearchError::NotConfigured(self.reason.clone()))
    }
}

// =============================================================================
// UNIT TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_success_response() -> serde_json::Value {
        serde_json::json!({
            "query": "Virat Kohli ODI runs",
            "results": [
                {
                    "title": "Virat Kohli - Stats",
                    "url": "https://example.com/kohli",
                    "content": "Virat Kohli has scored over 13,000 ODI runs.",
                    "score": 0.95
                },
                {
                    "title": "ODI records",
                    "url": "https://example.com/records",
                    "content": "Kohli holds the record for most ODI centuries.",
                    "score": 0.88
                }
            ]
        })
    }

    fn client_for(server: &MockServer) -> TavilyClient {
        TavilyClient::new("test-api-key")
            .with_base_url(server.uri())
            .with_timeout(Duration::from_secs(5))
    }

    #[test]
    fn test_from_config_missing_key() {
        let config = Config::default();
        let result = TavilyClient::from_config(&config);
        assert!(matches!(result, Err(SearchError::NotConfigured(_))));
    }

    #[test]
    fn test_from_config_with_key() {
        let config = Config {
            tavily_api_key: Some("tvly-key".to_string()),
            tavily_base_url: "http://localhost:9999/".to_string(),
            ..Config::default()
        };
        let client = TavilyClient::from_config(&config).unwrap();
        assert_eq!(client.base_url, "http://localhost:9999");
        assert_eq!(client.timeout, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_disabled_search_always_fails() {
        let search = DisabledSearch::new("no key");
        assert_eq!(
            search.search("anything", 3).await,
            Err(SearchError::NotConfigured("no key".to_string()))
        );
    }

    #[test]
    fn test_search_hit_deserializes_without_title() {
        let hit: SearchHit = serde_json::from_str(r#"{"content": "snippet"}"#).unwrap();
        assert_eq!(hit, SearchHit::from_content("snippet"));
    }

    #[tokio::test]
    async fn test_http_successful_search() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/search"))
            .and(header("Authorization", "Bearer test-api-key"))
            .and(body_partial_json(serde_json::json!({
                "query": "Virat Kohli ODI runs",
                "max_results": 3
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_success_response()))
            .mount(&mock_server)
            .await;

        let hits = client_for(&mock_server)
            .search("Virat Kohli ODI runs", 3)
            .await
            .unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Virat Kohli - Stats");
        assert!(hits[1].content.contains("centuries"));
    }

    #[tokio::test]
    async fn test_http_results_truncated_to_max() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_success_response()))
            .mount(&mock_server)
            .await;

        let hits = client_for(&mock_server).search("anything", 1).await.unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn test_http_unauthorized_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server).search("test", 3).await;
        assert_eq!(result, Err(SearchError::Unauthorized));
    }

    #[tokio::test]
    async fn test_http_rate_limited() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server).search("test", 3).await;
        assert_eq!(result, Err(SearchError::RateLimited));
    }

    #[tokio::test]
    async fn test_http_server_error_is_not_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server).search("test", 3).await;
        assert_eq!(
            result,
            Err(SearchError::ServerError(503, "down".to_string()))
        );
    }

    #[tokio::test]
    async fn test_http_malformed_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server).search("test", 3).await;
        assert!(matches!(result, Err(SearchError::ParseError(_))));
    }

    #[tokio::test]
    async fn test_http_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(sample_success_response())
                    .set_delay(Duration::from_secs(2)),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server).with_timeout(Duration::from_millis(50));
        let result = client.search("test", 3).await;
        assert_eq!(result, Err(SearchError::Timeout));
    }
}
