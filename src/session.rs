//! A session: one end-to-end run from initial query to final report.
//!
//! The session owns the constructed clients and hands them to the phase
//! agents by reference, so no client is ever built at module scope or more
//! than once per run.

use std::io::{self, BufRead, Write};

use rig::client::ProviderClient;
use rig::providers::anthropic;
use tracing::info;

use crate::brief::ResearchBrief;
use crate::clarify::{is_affirmative, Clarifier, ClarifyOutcome};
use crate::config::{self, Config};
use crate::error::AgentError;
use crate::prompts::Prompts;
use crate::report::Report;
use crate::researcher::Researcher;
use crate::search::TavilySearchTool;
use crate::transcript::Transcript;

/// The two phases of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Clarify,
    Research,
}

/// Route to the research phase iff the user approved the brief.
pub fn next_phase(approved: bool) -> Phase {
    if approved {
        Phase::Research
    } else {
        Phase::Clarify
    }
}

/// Session-ending sentinels.
pub fn is_quit(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "quit" | "exit")
}

/// Holds configuration and the two external clients for one run.
pub struct Session {
    config: Config,
    client: anthropic::Client,
    search: TavilySearchTool,
}

impl Session {
    /// Validate configuration and secrets, then construct the clients once.
    /// The secrets check runs first, so a misconfigured environment fails
    /// with an itemized message before any client exists.
    pub fn new(config: Config) -> Result<Self, AgentError> {
        config.validate()?;
        config::require_secrets()?;

        let client = anthropic::Client::from_env();
        let search = TavilySearchTool::from_env()
            .map_err(|e| AgentError::Config(e.to_string()))?
            .with_max_results(config.max_search_results);

        Ok(Self {
            config,
            client,
            search,
        })
    }

    /// Research a pre-assembled brief without any dialogue.
    pub async fn run_batch(&self, brief: ResearchBrief) -> Result<Report, AgentError> {
        let researcher = Researcher::new(&self.client, &self.config, self.search.clone());
        let body = researcher.run(&brief).await?;

        let report = Report::new(brief, body);
        self.persist(&report)?;
        Ok(report)
    }

    /// Run the full interactive session: clarification dialogue, brief
    /// confirmation, research, report. Returns `None` when the user quits
    /// before the research phase.
    pub async fn run_interactive(&self) -> Result<Option<Report>, AgentError> {
        let clarifier = Clarifier::new(&self.client, &self.config);
        let mut transcript = Transcript::new();

        // The greeting comes from a constant, never from a model call.
        let greeting = Clarifier::opening_message(&transcript).unwrap_or(Prompts::GREETING);
        println!("Assistant: {greeting}\n");
        transcript.push_system(Prompts::clarifier());
        transcript.push_assistant(greeting);

        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();

        let brief = loop {
            let Some(input) = prompt_line(&mut lines)? else {
                return Ok(None);
            };
            if is_quit(&input) {
                println!("\nGoodbye!");
                return Ok(None);
            }
            if input.trim().is_empty() {
                // Re-surface the pending question instead of calling the model.
                if let Some(question) = transcript.last_assistant() {
                    println!("\nAssistant: {question}\n");
                }
                continue;
            }

            transcript.push_user(input);

            match clarifier.next(&transcript).await? {
                ClarifyOutcome::NeedsMoreInput(question) => {
                    println!("\nAssistant: {question}\n");
                    transcript.push_assistant(question);
                }
                ClarifyOutcome::Ready(candidate) => {
                    println!("\nAssistant: Here's the research brief I've put together:\n");
                    println!("{}\n", candidate.summary());
                    println!("Shall I start the research? (yes/no)");
                    transcript.push_assistant(format!("Research brief:\n{}", candidate.summary()));

                    let Some(answer) = prompt_line(&mut lines)? else {
                        return Ok(None);
                    };
                    if is_quit(&answer) {
                        println!("\nGoodbye!");
                        return Ok(None);
                    }

                    match next_phase(is_affirmative(&answer)) {
                        Phase::Research => break candidate,
                        Phase::Clarify => {
                            const REVISE: &str = "No problem - tell me what to change.";
                            println!("\nAssistant: {REVISE}\n");
                            transcript.push_user(answer);
                            transcript.push_assistant(REVISE);
                        }
                    }
                }
            }
        };

        println!("\nConducting research now; this can take a few minutes...\n");

        let report = self.run_batch(brief).await?;

        // Echo a display preview into the transcript; the full report is
        // printed by the caller and saved by `persist`.
        transcript.push_assistant(format!(
            "Research complete. Here's a preview of the report:\n\n{}",
            report.preview(500)
        ));
        info!(transcript_entries = transcript.len(), "session transcript closed");

        Ok(Some(report))
    }

    fn persist(&self, report: &Report) -> Result<(), AgentError> {
        if let Some(path) = &self.config.report_path {
            report.save(path)?;
            info!(path = %path.display(), "report saved");
            println!("Report saved to '{}'", path.display());
        }
        Ok(())
    }
}

/// Print the input prompt and read one line. `None` means EOF.
fn prompt_line(
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> Result<Option<String>, AgentError> {
    print!("You: ");
    io::stdout().flush()?;

    match lines.next() {
        Some(line) => Ok(Some(line?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_phase_routes_on_approval() {
        assert_eq!(next_phase(true), Phase::Research);
        assert_eq!(next_phase(false), Phase::Clarify);
    }

    #[test]
    fn test_router_composes_with_sentinel_classifier() {
        // End-to-end routing over the documented edge cases.
        assert_eq!(next_phase(is_affirmative("YES")), Phase::Research);
        assert_eq!(next_phase(is_affirmative("y")), Phase::Research);
        assert_eq!(next_phase(is_affirmative("")), Phase::Clarify);
        assert_eq!(next_phase(is_affirmative("no thanks")), Phase::Clarify);
    }

    #[test]
    fn test_is_quit() {
        assert!(is_quit("quit"));
        assert!(is_quit("EXIT"));
        assert!(is_quit("  quit  "));
        assert!(!is_quit("quit the smoking topic"));
        assert!(!is_quit(""));
    }
}
