//! Prompt templates for both phases.
//!
//! Kept in one place so the dialogue wording, extraction preambles, and the
//! researcher's system prompt can be reviewed together.

use chrono::Utc;

use crate::brief::ResearchBrief;

/// Prompt templates for the clarify and research phases.
pub struct Prompts;

impl Prompts {
    /// Opening message for a fresh session. Emitted before any model call,
    /// so an empty transcript never produces an empty response.
    pub const GREETING: &'static str = "Hello! I'm here to help you with your research. \
        Could you tell me what topic you'd like me to investigate, and what \
        you're hoping to learn about it?";

    /// Canned follow-up used when brief extraction fails and the dialogue
    /// has to continue without a usable brief.
    pub const RETRY_QUESTION: &'static str = "I don't have a complete picture yet. Could you \
        restate the main topic and the questions you most want answered?";

    fn current_date() -> String {
        Utc::now().format("%Y-%m-%d").to_string()
    }

    /// System prompt for the clarification dialogue.
    pub fn clarifier() -> &'static str {
        "You are a research assistant helping to clarify the scope of a research task. \
         Your goal is to gather enough information to create a clear research brief.\n\n\
         Ask clarifying questions about:\n\
         1. The main topic or question to research\n\
         2. Specific aspects or subtopics to focus on\n\
         3. Any constraints or requirements (time period, geography, industry)\n\
         4. The desired depth of research: surface, moderate, or deep\n\
         5. The target audience for the final report\n\n\
         Ask one or two focused questions at a time. Be conversational but \
         stay on task. Never answer the research question yourself."
    }

    /// Preamble for the readiness classification (structured output).
    pub fn readiness() -> &'static str {
        "Analyze the conversation between a research assistant and a user. \
         Decide whether enough information has been gathered to write a \
         research brief: a clear topic, a sense of scope, and at least two \
         concrete questions to answer. Set `ready` accordingly. When not \
         ready, set `missing` to a short description of what still needs \
         to be asked."
    }

    /// Preamble for extracting the research brief (structured output).
    pub fn brief_extraction() -> &'static str {
        "Extract a research brief from the conversation between a research \
         assistant and a user. Capture the topic, scope, required depth, \
         target audience, the key questions to answer, and any constraints \
         the user mentioned. Where a detail was never discussed, make a \
         reasonable assumption from context rather than leaving it blank."
    }

    /// System prompt for the research agent, parameterized by the brief.
    pub fn researcher(brief: &ResearchBrief) -> String {
        let questions = brief
            .key_questions
            .iter()
            .map(|q| format!("- {q}"))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "For context, today's date is {date}.\n\n\
             You are an expert research agent conducting web research based on \
             the following brief:\n\n\
             Topic: {topic}\n\
             Scope: {scope}\n\
             Audience: {audience}\n\n\
             Key questions to answer:\n{questions}\n\n\
             {depth_guidance}\n\n\
             Your process:\n\
             1. Break the brief into searchable components\n\
             2. Use the tavily_search tool for targeted searches; prefer several \
             focused queries over one broad one\n\
             3. Verify important facts across more than one source\n\
             4. Stop searching once your last two searches return redundant \
             information\n\
             5. Write a detailed, well-structured markdown report\n\n\
             Report requirements:\n\
             - Begin with an executive summary\n\
             - Address every key question under its own heading\n\
             - Cite sources inline as [1], [2], ... and end with a Sources \
             section listing each cited URL\n\
             - End with conclusions\n\
             - Write as a professional report, without self-referential \
             language or meta-commentary",
            date = Self::current_date(),
            topic = brief.topic,
            scope = brief.scope,
            audience = brief.audience,
            depth_guidance = brief.depth.guidance(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brief::DepthLevel;

    fn sample_brief() -> ResearchBrief {
        ResearchBrief {
            topic: "Grid-scale batteries".to_string(),
            scope: "Deployments since 2020".to_string(),
            depth: DepthLevel::Moderate,
            audience: "Policy analysts".to_string(),
            key_questions: vec![
                "What chemistries dominate?".to_string(),
                "How have costs moved?".to_string(),
            ],
            constraints: None,
        }
    }

    #[test]
    fn test_greeting_is_not_empty() {
        assert!(!Prompts::GREETING.is_empty());
        assert!(Prompts::GREETING.contains("research"));
    }

    #[test]
    fn test_clarifier_covers_brief_fields() {
        let prompt = Prompts::clarifier();
        assert!(prompt.contains("topic"));
        assert!(prompt.contains("depth"));
        assert!(prompt.contains("audience"));
    }

    #[test]
    fn test_researcher_prompt_contains_date() {
        let prompt = Prompts::researcher(&sample_brief());
        assert!(prompt.contains("today's date is"));
    }

    #[test]
    fn test_researcher_prompt_contains_questions_verbatim() {
        let brief = sample_brief();
        let prompt = Prompts::researcher(&brief);

        for question in &brief.key_questions {
            assert!(prompt.contains(question));
        }
        assert!(prompt.contains("tavily_search"));
    }

    #[test]
    fn test_researcher_prompt_tracks_depth() {
        let mut brief = sample_brief();
        brief.depth = DepthLevel::Deep;
        let prompt = Prompts::researcher(&brief);
        assert!(prompt.contains(DepthLevel::Deep.guidance()));
    }
}
