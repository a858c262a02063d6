//! Clarification phase: dialogue that turns a vague request into a
//! [`ResearchBrief`].
//!
//! Each turn produces an explicit [`ClarifyOutcome`] instead of a sentinel
//! embedded in model text: either a follow-up question for the user, or a
//! finished brief. Readiness is judged by a structured-output classification,
//! with a hard round cap after which the brief is finalized from whatever has
//! been gathered.

use rig::client::CompletionClient;
use rig::completion::Chat;
use rig::providers::anthropic;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::brief::ResearchBrief;
use crate::config::Config;
use crate::error::AgentError;
use crate::prompts::Prompts;
use crate::transcript::Transcript;

/// Result of one clarification turn.
#[derive(Debug, Clone, PartialEq)]
pub enum ClarifyOutcome {
    /// The dialogue continues; show this question to the user.
    NeedsMoreInput(String),
    /// Enough information was gathered; the brief is ready for confirmation.
    Ready(ResearchBrief),
}

/// Structured-output verdict on whether the dialogue has gathered enough.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
struct ReadinessCheck {
    /// True once the conversation contains a clear topic, a sense of scope,
    /// and at least two concrete questions to answer.
    ready: bool,

    /// When not ready, a short note on what still needs to be asked.
    missing: Option<String>,
}

/// The clarification agent. Borrows the session's client; builds its own
/// rig agents per call.
pub struct Clarifier<'a> {
    client: &'a anthropic::Client,
    config: &'a Config,
}

impl<'a> Clarifier<'a> {
    pub fn new(client: &'a anthropic::Client, config: &'a Config) -> Self {
        Self { client, config }
    }

    /// The canned opening for a session with no prior messages. Pure, so a
    /// fresh session can never produce an empty response.
    pub fn opening_message(transcript: &Transcript) -> Option<&'static str> {
        transcript.is_empty().then_some(Prompts::GREETING)
    }

    /// Run one clarification turn over the transcript.
    pub async fn next(&self, transcript: &Transcript) -> Result<ClarifyOutcome, AgentError> {
        if transcript.is_empty() {
            return Ok(ClarifyOutcome::NeedsMoreInput(Prompts::GREETING.to_string()));
        }

        let rounds = transcript.user_turns();
        debug!(rounds, last_user = transcript.last_user().unwrap_or_default(), "clarification turn");

        if rounds >= self.config.max_clarify_rounds {
            debug!(rounds, "clarification round cap reached, finalizing brief");
            return self.finalize(transcript).await;
        }

        match self.check_readiness(transcript).await {
            Ok(check) if check.ready => self.finalize(transcript).await,
            Ok(check) => {
                debug!(missing = check.missing.as_deref().unwrap_or(""), "not ready yet");
                self.follow_up(transcript).await
            }
            Err(e) => {
                warn!(error = %e, "readiness check failed, continuing dialogue");
                self.follow_up(transcript).await
            }
        }
    }

    async fn check_readiness(&self, transcript: &Transcript) -> Result<ReadinessCheck, AgentError> {
        let extractor = self
            .client
            .extractor::<ReadinessCheck>(&self.config.clarifier_model)
            .preamble(Prompts::readiness())
            .max_tokens(self.config.max_tokens)
            .build();

        let dialogue = transcript.rendered();
        extractor
            .extract(dialogue.as_str())
            .await
            .map_err(|e| AgentError::Extraction(e.to_string()))
    }

    /// Extract the brief from the dialogue. An extraction that fails or
    /// yields an unusable brief is dropped and the dialogue continues.
    async fn finalize(&self, transcript: &Transcript) -> Result<ClarifyOutcome, AgentError> {
        let extractor = self
            .client
            .extractor::<ResearchBrief>(&self.config.clarifier_model)
            .preamble(Prompts::brief_extraction())
            .max_tokens(self.config.max_tokens)
            .build();

        let dialogue = transcript.rendered();
        match extractor.extract(dialogue.as_str()).await {
            Ok(brief) if brief.is_actionable() => Ok(ClarifyOutcome::Ready(brief)),
            Ok(_) => {
                warn!("extracted brief was missing a topic or questions, dropping it");
                Ok(ClarifyOutcome::NeedsMoreInput(Prompts::RETRY_QUESTION.to_string()))
            }
            Err(e) => {
                warn!(error = %e, "brief extraction failed, dropping it");
                Ok(ClarifyOutcome::NeedsMoreInput(Prompts::RETRY_QUESTION.to_string()))
            }
        }
    }

    /// Ask the next clarifying question, with the dialogue so far as history.
    async fn follow_up(&self, transcript: &Transcript) -> Result<ClarifyOutcome, AgentError> {
        let agent = self
            .client
            .agent(&self.config.clarifier_model)
            .preamble(Prompts::clarifier())
            .max_tokens(self.config.max_tokens)
            .temperature(self.config.temperature)
            .build();

        let (history, prompt) = transcript
            .history_and_prompt()
            .unwrap_or_else(|| (vec![], transcript.rendered()));

        let question = agent
            .chat(prompt, history)
            .await
            .map_err(|e| AgentError::Completion(e.to_string()))?;

        Ok(ClarifyOutcome::NeedsMoreInput(question))
    }
}

/// Sentinels accepted as approval of the presented brief. Matched exactly
/// against the trimmed, lowercased input so that a hedged reply ("yes, but
/// also...") keeps the dialogue open instead of starting the research.
const AFFIRMATIVES: [&str; 16] = [
    "yes",
    "y",
    "yes please",
    "yep",
    "yeah",
    "ok",
    "okay",
    "sure",
    "confirm",
    "approve",
    "approved",
    "proceed",
    "go ahead",
    "looks good",
    "correct",
    "done",
];

/// Does this input approve the brief?
pub fn is_affirmative(input: &str) -> bool {
    let normalized = input.trim().to_lowercase();
    AFFIRMATIVES.contains(&normalized.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opening_message_for_empty_transcript() {
        let transcript = Transcript::new();
        let opening = Clarifier::opening_message(&transcript);

        assert_eq!(opening, Some(Prompts::GREETING));
        assert!(!opening.unwrap().is_empty());
    }

    #[test]
    fn test_no_opening_once_conversation_started() {
        let mut transcript = Transcript::new();
        transcript.push_user("research solar panels");
        assert_eq!(Clarifier::opening_message(&transcript), None);
    }

    #[test]
    fn test_is_affirmative_accepts_common_forms() {
        assert!(is_affirmative("yes"));
        assert!(is_affirmative("YES"));
        assert!(is_affirmative("  y  "));
        assert!(is_affirmative("Looks Good"));
        assert!(is_affirmative("go ahead"));
        assert!(is_affirmative("done"));
    }

    #[test]
    fn test_is_affirmative_rejects_everything_else() {
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("   "));
        assert!(!is_affirmative("no"));
        assert!(!is_affirmative("no thanks"));
        assert!(!is_affirmative("yes, but change the audience"));
        assert!(!is_affirmative("maybe"));
    }

    #[test]
    fn test_readiness_check_deserializes() {
        let check: ReadinessCheck =
            serde_json::from_str(r#"{"ready": false, "missing": "audience"}"#).unwrap();
        assert!(!check.ready);
        assert_eq!(check.missing.as_deref(), Some("audience"));

        let check: ReadinessCheck = serde_json::from_str(r#"{"ready": true, "missing": null}"#).unwrap();
        assert!(check.ready);
    }

    #[test]
    fn test_outcome_variants_compare() {
        let a = ClarifyOutcome::NeedsMoreInput("what scope?".to_string());
        let b = ClarifyOutcome::NeedsMoreInput("what scope?".to_string());
        assert_eq!(a, b);
    }
}
