//! Research phase: the tool-calling loop.
//!
//! The loop itself belongs to rig: we build an agent with the researcher
//! preamble and the Tavily tool, hand it the brief's instruction, and bound it
//! with a turn budget. When the budget runs out mid-investigation, the last
//! assistant text is recovered from the chat history and annotated instead of
//! being thrown away.

use rig::client::CompletionClient;
use rig::completion::{AssistantContent, Message, Prompt, PromptError};
use rig::providers::anthropic;
use tracing::{info, warn};

use crate::brief::ResearchBrief;
use crate::config::Config;
use crate::error::AgentError;
use crate::prompts::Prompts;
use crate::search::TavilySearchTool;

/// Runs the research loop for a confirmed brief.
pub struct Researcher<'a> {
    client: &'a anthropic::Client,
    config: &'a Config,
    search: TavilySearchTool,
}

impl<'a> Researcher<'a> {
    pub fn new(client: &'a anthropic::Client, config: &'a Config, search: TavilySearchTool) -> Self {
        Self {
            client,
            config,
            search,
        }
    }

    /// Research the brief and return the drafted report body.
    pub async fn run(&self, brief: &ResearchBrief) -> Result<String, AgentError> {
        let agent = self
            .client
            .agent(&self.config.model)
            .preamble(&Prompts::researcher(brief))
            .max_tokens(self.config.max_tokens)
            .temperature(self.config.temperature)
            .tool(self.search.clone())
            .build();

        info!(topic = %brief.topic, turns = self.config.max_research_turns, "starting research loop");

        match agent
            .prompt(brief.research_instruction())
            .multi_turn(self.config.max_research_turns)
            .await
        {
            Ok(report) => {
                info!("research loop completed");
                Ok(report)
            }
            Err(PromptError::MaxDepthError {
                max_depth,
                chat_history,
                ..
            }) => {
                warn!(max_depth, "research loop hit its turn budget, recovering partial findings");
                Ok(partial_report(&chat_history, max_depth))
            }
            Err(e) => Err(AgentError::Completion(e.to_string())),
        }
    }
}

/// Recover the most recent assistant text from an interrupted loop and
/// annotate it as incomplete.
fn partial_report(history: &[Message], max_depth: usize) -> String {
    let last_text = history
        .iter()
        .rev()
        .find_map(|msg| {
            if let Message::Assistant { content, .. } = msg {
                let text = content
                    .iter()
                    .filter_map(|c| {
                        if let AssistantContent::Text(text) = c {
                            Some(text.text.clone())
                        } else {
                            None
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("\n");

                (!text.is_empty()).then_some(text)
            } else {
                None
            }
        })
        .unwrap_or_else(|| {
            "The research loop was interrupted before producing findings.".to_string()
        });

    format!(
        "{last_text}\n\n---\n*Research was cut short after {max_depth} turns; \
         the findings above may be incomplete.*"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_report_recovers_last_assistant_text() {
        let history = vec![
            Message::user("Research X"),
            Message::assistant("Early findings about X."),
            Message::user("tool result"),
            Message::assistant("Later, more complete findings about X."),
        ];

        let report = partial_report(&history, 12);
        assert!(report.contains("Later, more complete findings about X."));
        assert!(!report.starts_with("Early findings"));
        assert!(report.contains("cut short after 12 turns"));
    }

    #[test]
    fn test_partial_report_with_no_assistant_text() {
        let history = vec![Message::user("Research X")];

        let report = partial_report(&history, 3);
        assert!(report.contains("interrupted before producing findings"));
        assert!(report.contains("cut short after 3 turns"));
    }

    #[test]
    fn test_partial_report_empty_history() {
        let report = partial_report(&[], 1);
        assert!(report.contains("interrupted before producing findings"));
    }
}
