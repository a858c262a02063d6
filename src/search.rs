//! Tavily web search tool.
//!
//! A typed client for the Tavily Search API exposed to the research agent as
//! a rig tool. Transient failures are retried with exponential backoff; a
//! search that still fails after retries is reported back to the model as an
//! explanatory tool result so the research loop can continue.

use std::time::Duration;

use reqwest::Client;
use rig::completion::ToolDefinition;
use rig::tool::Tool;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Default timeout for Tavily API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum retry attempts for transient failures.
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(1000);

const TAVILY_BASE_URL: &str = "https://api.tavily.com";

/// Typed errors for the Tavily API.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("unauthorized - check TAVILY_API_KEY")]
    Unauthorized,

    #[error("rate limited - too many requests")]
    RateLimited,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("server error ({0}): {1}")]
    Server(u16, String),

    #[error("HTTP error ({0}): {1}")]
    Http(u16, String),

    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("TAVILY_API_KEY environment variable not set")]
    MissingKey,
}

impl SearchError {
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            SearchError::Timeout
                | SearchError::Connection(_)
                | SearchError::RateLimited
                | SearchError::Server(_, _)
        )
    }
}

/// Search depth for the Tavily API.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    /// Fast search with basic results.
    #[default]
    Basic,
    /// More thorough search with detailed results.
    Advanced,
}

impl SearchDepth {
    fn as_str(&self) -> &'static str {
        match self {
            SearchDepth::Basic => "basic",
            SearchDepth::Advanced => "advanced",
        }
    }
}

/// Topic filter for the Tavily API.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    /// General web search.
    #[default]
    General,
    /// Recent news articles.
    News,
}

impl Topic {
    fn as_str(&self) -> &'static str {
        match self {
            Topic::General => "general",
            Topic::News => "news",
        }
    }
}

/// Request body for the Tavily `/search` endpoint.
#[derive(Debug, Serialize)]
pub struct TavilyRequest {
    pub query: String,
    pub max_results: u32,
    pub search_depth: String,
    pub topic: String,
    pub include_answer: bool,
}

/// Response from the Tavily API.
#[derive(Debug, Deserialize)]
pub struct TavilyResponse {
    /// Synthesized answer, present when `include_answer` was requested.
    pub answer: Option<String>,
    pub results: Vec<SearchResult>,
}

/// A single search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    /// Extracted content snippet.
    pub content: String,
    /// Relevance score, 0 to 1.
    pub score: f64,
}

impl SearchResult {
    fn to_markdown(&self) -> String {
        format!(
            "### [{}]({})\n**Relevance:** {:.0}%\n\n{}\n",
            self.title,
            self.url,
            self.score * 100.0,
            self.content
        )
    }
}

/// Web search tool backed by the Tavily Search API.
#[derive(Clone)]
pub struct TavilySearchTool {
    api_key: String,
    client: Client,
    base_url: String,
    timeout: Duration,
    max_retries: u32,
    retry_base_delay: Duration,
    max_results: usize,
}

impl TavilySearchTool {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: Client::new(),
            base_url: TAVILY_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: MAX_RETRIES,
            retry_base_delay: RETRY_BASE_DELAY,
            max_results: 5,
        }
    }

    /// Create from the `TAVILY_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, SearchError> {
        let api_key = std::env::var("TAVILY_API_KEY").map_err(|_| SearchError::MissingKey)?;
        Ok(Self::new(api_key))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    /// Default result count when the model does not ask for one.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Execute a search, retrying transient failures with backoff.
    pub async fn search(&self, request: &TavilyRequest) -> Result<TavilyResponse, SearchError> {
        let mut last_error = SearchError::Network("no attempts made".to_string());

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.retry_base_delay * 2u32.pow(attempt - 1);
                debug!(attempt, delay_ms = delay.as_millis() as u64, "retrying Tavily request");
                tokio::time::sleep(delay).await;
            }

            match self.send_once(request).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    if !e.is_retryable() {
                        return Err(e);
                    }
                    warn!(attempt, error = %e, "Tavily request failed, will retry");
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    async fn send_once(&self, request: &TavilyRequest) -> Result<TavilyResponse, SearchError> {
        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout
                } else if e.is_connect() {
                    SearchError::Connection(e.to_string())
                } else {
                    SearchError::Network(e.to_string())
                }
            })?;

        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| SearchError::Parse(e.to_string()));
        }

        let error_text = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 => Err(SearchError::Unauthorized),
            429 => Err(SearchError::RateLimited),
            400 => Err(SearchError::BadRequest(error_text)),
            500..=599 => Err(SearchError::Server(status.as_u16(), error_text)),
            _ => Err(SearchError::Http(status.as_u16(), error_text)),
        }
    }
}

/// Arguments the model passes to the `tavily_search` tool.
#[derive(Debug, Deserialize)]
pub struct SearchArgs {
    /// The search query.
    pub query: String,

    /// Result count override.
    #[serde(default)]
    pub max_results: Option<u32>,

    #[serde(default)]
    pub search_depth: SearchDepth,

    #[serde(default)]
    pub topic: Topic,

    /// Ask Tavily for a synthesized answer alongside the results.
    #[serde(default = "default_include_answer")]
    pub include_answer: bool,
}

fn default_include_answer() -> bool {
    true
}

/// Render a Tavily response as markdown for the model.
fn format_results(query: &str, response: &TavilyResponse) -> String {
    let mut output = format!("## Search results for: \"{query}\"\n\n");

    if let Some(answer) = &response.answer {
        output.push_str("### Answer\n");
        output.push_str(answer);
        output.push_str("\n\n---\n\n");
    }

    if response.results.is_empty() {
        output.push_str("No results found.\n");
    } else {
        for result in &response.results {
            output.push_str(&result.to_markdown());
            output.push('\n');
        }
    }

    output
}

impl Tool for TavilySearchTool {
    const NAME: &'static str = "tavily_search";

    type Args = SearchArgs;
    type Output = String;
    type Error = SearchError;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Search the web using the Tavily Search API. Returns relevant pages \
                          with titles, URLs, and content snippets, plus an optional synthesized \
                          answer."
                .to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query to execute",
                        "maxLength": 400
                    },
                    "max_results": {
                        "type": "integer",
                        "description": "Maximum number of results to return (1-20)",
                        "minimum": 1,
                        "maximum": 20
                    },
                    "search_depth": {
                        "type": "string",
                        "enum": ["basic", "advanced"],
                        "description": "'basic' for fast results, 'advanced' for a more thorough search",
                        "default": "basic"
                    },
                    "topic": {
                        "type": "string",
                        "enum": ["general", "news"],
                        "description": "'general' for all content, 'news' for recent news",
                        "default": "general"
                    },
                    "include_answer": {
                        "type": "boolean",
                        "description": "Include a synthesized answer summarizing the results",
                        "default": true
                    }
                },
                "required": ["query"],
                "additionalProperties": false
            }),
        }
    }

    /// Execute the search. A failure after retries is folded into the tool
    /// result text so the research loop keeps going instead of aborting.
    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        let max_results = args
            .max_results
            .unwrap_or(self.max_results as u32)
            .clamp(1, 20);

        let request = TavilyRequest {
            query: args.query.clone(),
            max_results,
            search_depth: args.search_depth.as_str().to_string(),
            topic: args.topic.as_str().to_string(),
            include_answer: args.include_answer,
        };

        match self.search(&request).await {
            Ok(response) => Ok(format_results(&args.query, &response)),
            Err(e) => {
                warn!(query = %args.query, error = %e, "search failed after retries");
                Ok(format!(
                    "Search for \"{}\" failed: {}. Try a different query, or continue \
                     with the information gathered so far.",
                    args.query, e
                ))
            }
        }
    }
}
