//! Error types shared across the agent.
//!
//! The search tool keeps its own `SearchError` (see `search.rs`); everything
//! else that can fail funnels into [`AgentError`].

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error for configuration, completion, and report handling.
#[derive(Error, Debug)]
pub enum AgentError {
    /// One or more required secrets are absent from the environment.
    /// The message itemizes exactly the missing variable names.
    #[error("missing required environment variables: {}", .0.join(", "))]
    MissingEnv(Vec<String>),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// A model completion call failed (network, provider, or loop error).
    #[error("model completion failed: {0}")]
    Completion(String),

    /// Structured-output extraction did not produce a value matching the schema.
    #[error("structured extraction failed: {0}")]
    Extraction(String),

    #[error("failed to write report to {}: {source}", .path.display())]
    ReportIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_env_lists_all_names() {
        let err = AgentError::MissingEnv(vec![
            "ANTHROPIC_API_KEY".to_string(),
            "TAVILY_API_KEY".to_string(),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("ANTHROPIC_API_KEY"));
        assert!(msg.contains("TAVILY_API_KEY"));
    }

    #[test]
    fn test_report_io_includes_path() {
        let err = AgentError::ReportIo {
            path: PathBuf::from("/tmp/report.md"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/tmp/report.md"));
    }
}
