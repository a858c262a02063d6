//! Configuration loading and validation.
//!
//! All settings come from the process environment (optionally seeded from a
//! `.env` file via dotenvy), with CLI flags layered on top in `main`. The two
//! required secrets are checked up front so a misconfigured run fails with an
//! itemized message before any client is built.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::error::AgentError;

/// Environment variables that must be present before a session can start.
pub const REQUIRED_ENV: [&str; 2] = ["ANTHROPIC_API_KEY", "TAVILY_API_KEY"];

/// Runtime configuration for a research session.
#[derive(Debug, Clone)]
pub struct Config {
    /// Model used for the research phase (tool-calling loop and report).
    pub model: String,

    /// Lighter model used for the clarification dialogue and extraction.
    pub clarifier_model: String,

    /// Sampling temperature for completions (Anthropic range: 0.0 to 1.0).
    pub temperature: f64,

    /// Maximum tokens per completion. Required by the Anthropic API.
    pub max_tokens: u64,

    /// Default number of results the search tool requests from Tavily.
    pub max_search_results: usize,

    /// Clarification rounds before the brief is finalized from whatever
    /// has been gathered.
    pub max_clarify_rounds: usize,

    /// Turn budget for the research agent's tool-calling loop.
    pub max_research_turns: usize,

    /// Where the final report is written. `None` disables saving.
    pub report_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: "claude-3-5-sonnet-20241022".to_string(),
            clarifier_model: "claude-3-5-haiku-20241022".to_string(),
            temperature: 0.3,
            max_tokens: 8192,
            max_search_results: 5,
            max_clarify_rounds: 5,
            max_research_turns: 12,
            report_path: Some(PathBuf::from("research_report.md")),
        }
    }
}

impl Config {
    /// Load configuration from the environment, seeding it from `.env` when
    /// one exists. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut config = Config::default();

        if let Ok(val) = env::var("RESEARCH_MODEL") {
            config.model = val;
        }

        if let Ok(val) = env::var("CLARIFIER_MODEL") {
            config.clarifier_model = val;
        }

        if let Ok(val) = env::var("TEMPERATURE") {
            config.temperature = val
                .parse()
                .context("TEMPERATURE must be a valid floating-point number (e.g., 0.3)")?;
        }

        if let Ok(val) = env::var("MAX_TOKENS") {
            config.max_tokens = val
                .parse()
                .context("MAX_TOKENS must be a valid positive integer")?;
        }

        if let Ok(val) = env::var("MAX_SEARCH_RESULTS") {
            config.max_search_results = val
                .parse()
                .context("MAX_SEARCH_RESULTS must be a valid positive integer")?;
        }

        if let Ok(val) = env::var("MAX_CLARIFY_ROUNDS") {
            config.max_clarify_rounds = val
                .parse()
                .context("MAX_CLARIFY_ROUNDS must be a valid positive integer")?;
        }

        if let Ok(val) = env::var("MAX_RESEARCH_TURNS") {
            config.max_research_turns = val
                .parse()
                .context("MAX_RESEARCH_TURNS must be a valid positive integer")?;
        }

        if let Ok(val) = env::var("REPORT_PATH") {
            config.report_path = Some(PathBuf::from(val));
        }

        Ok(config)
    }

    /// Validate that all values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), AgentError> {
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(AgentError::Config(format!(
                "temperature must be between 0.0 and 1.0, got {}",
                self.temperature
            )));
        }

        if self.max_tokens == 0 {
            return Err(AgentError::Config(
                "MAX_TOKENS must be at least 1".to_string(),
            ));
        }

        if self.max_search_results == 0 || self.max_search_results > 20 {
            return Err(AgentError::Config(format!(
                "MAX_SEARCH_RESULTS must be between 1 and 20, got {}",
                self.max_search_results
            )));
        }

        if self.max_clarify_rounds == 0 {
            return Err(AgentError::Config(
                "MAX_CLARIFY_ROUNDS must be at least 1".to_string(),
            ));
        }

        if self.max_research_turns == 0 {
            return Err(AgentError::Config(
                "MAX_RESEARCH_TURNS must be at least 1".to_string(),
            ));
        }

        if self.model.is_empty() || self.clarifier_model.is_empty() {
            return Err(AgentError::Config("model name cannot be empty".to_string()));
        }

        Ok(())
    }
}

/// Check the required secrets through the given lookup, returning the names
/// that are missing, in declaration order.
pub fn missing_secrets<F>(lookup: F) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    REQUIRED_ENV
        .iter()
        .filter(|name| match lookup(name) {
            Some(val) => val.trim().is_empty(),
            None => true,
        })
        .map(|name| name.to_string())
        .collect()
}

/// Fail fast when any required secret is absent. Runs before any client is
/// constructed, so no network call is ever attempted without credentials.
pub fn require_secrets() -> Result<(), AgentError> {
    let missing = missing_secrets(|name| env::var(name).ok());
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AgentError::MissingEnv(missing))
    }
}
