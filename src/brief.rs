//! The research brief: the structured output of the clarification phase and
//! the sole input to the research phase.

use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How deep the research should go.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DepthLevel {
    /// Quick overview of the main points.
    Surface,
    /// Balanced coverage with supporting detail.
    #[default]
    Moderate,
    /// Thorough investigation with multiple perspectives per question.
    Deep,
}

impl DepthLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DepthLevel::Surface => "surface",
            DepthLevel::Moderate => "moderate",
            DepthLevel::Deep => "deep",
        }
    }

    /// Guidance line interpolated into the researcher's system prompt.
    pub fn guidance(&self) -> &'static str {
        match self {
            DepthLevel::Surface => {
                "Keep the report short: cover the main points with one source each."
            }
            DepthLevel::Moderate => {
                "Cover each question with supporting detail and at least two sources."
            }
            DepthLevel::Deep => {
                "Investigate thoroughly: compare multiple perspectives and note where sources disagree."
            }
        }
    }
}

/// Structured summary of what to research, assembled from the clarification
/// dialogue (or directly from CLI arguments in batch mode).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ResearchBrief {
    /// Main research topic.
    pub topic: String,

    /// Scope and boundaries of the research.
    pub scope: String,

    /// Required depth of investigation.
    #[serde(default)]
    pub depth: DepthLevel,

    /// Target audience for the final report.
    pub audience: String,

    /// Key questions the report must answer.
    pub key_questions: Vec<String>,

    /// Constraints or limitations mentioned by the user (time period,
    /// geography, sources to prefer or avoid).
    #[serde(default)]
    pub constraints: Option<Vec<String>>,
}

impl ResearchBrief {
    /// The instruction handed to the research agent as its opening prompt.
    /// Every key question appears verbatim.
    pub fn research_instruction(&self) -> String {
        let questions = self
            .key_questions
            .iter()
            .map(|q| format!("- {q}"))
            .collect::<Vec<_>>()
            .join("\n");

        let constraints = match self.constraints.as_deref() {
            Some(list) if !list.is_empty() => list
                .iter()
                .map(|c| format!("- {c}"))
                .collect::<Vec<_>>()
                .join("\n"),
            _ => "- None specified".to_string(),
        };

        format!(
            "Conduct comprehensive research based on this brief.\n\n\
             Topic: {topic}\n\
             Scope: {scope}\n\
             Depth: {depth}\n\
             Audience: {audience}\n\n\
             Key questions to answer:\n{questions}\n\n\
             Constraints:\n{constraints}\n\n\
             Search the web as needed, then write a detailed report that \
             addresses every key question at the requested depth for the \
             target audience.",
            topic = self.topic,
            scope = self.scope,
            depth = self.depth.as_str(),
            audience = self.audience,
        )
    }

    /// Markdown summary shown to the user for confirmation before the
    /// research phase starts.
    pub fn summary(&self) -> String {
        let questions = self
            .key_questions
            .iter()
            .map(|q| format!("- {q}"))
            .collect::<Vec<_>>()
            .join("\n");

        let constraints = match self.constraints.as_deref() {
            Some(list) if !list.is_empty() => list
                .iter()
                .map(|c| format!("- {c}"))
                .collect::<Vec<_>>()
                .join("\n"),
            _ => "None specified".to_string(),
        };

        format!(
            "**Topic:** {topic}\n\n\
             **Scope:** {scope}\n\n\
             **Depth:** {depth}\n\n\
             **Audience:** {audience}\n\n\
             **Key questions:**\n{questions}\n\n\
             **Constraints:** {constraints}",
            topic = self.topic,
            scope = self.scope,
            depth = self.depth.as_str(),
            audience = self.audience,
        )
    }

    /// A brief is usable once it names a topic and at least one question.
    pub fn is_actionable(&self) -> bool {
        !self.topic.trim().is_empty()
            && self.key_questions.iter().any(|q| !q.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_brief() -> ResearchBrief {
        ResearchBrief {
            topic: "Rust async runtimes".to_string(),
            scope: "Production server workloads in 2024".to_string(),
            depth: DepthLevel::Deep,
            audience: "Backend engineers".to_string(),
            key_questions: vec![
                "How does tokio's scheduler work?".to_string(),
                "When is a current-thread runtime preferable?".to_string(),
                "What are the common pitfalls with blocking calls?".to_string(),
            ],
            constraints: Some(vec!["Focus on open-source projects".to_string()]),
        }
    }

    #[test]
    fn test_instruction_contains_all_questions_verbatim() {
        let brief = sample_brief();
        let instruction = brief.research_instruction();

        for question in &brief.key_questions {
            assert!(
                instruction.contains(question),
                "instruction missing question: {question}"
            );
        }
    }

    #[test]
    fn test_instruction_contains_brief_fields() {
        let brief = sample_brief();
        let instruction = brief.research_instruction();

        assert!(instruction.contains("Rust async runtimes"));
        assert!(instruction.contains("Production server workloads in 2024"));
        assert!(instruction.contains("deep"));
        assert!(instruction.contains("Backend engineers"));
        assert!(instruction.contains("Focus on open-source projects"));
    }

    #[test]
    fn test_instruction_without_constraints() {
        let mut brief = sample_brief();
        brief.constraints = None;
        assert!(brief.research_instruction().contains("None specified"));

        brief.constraints = Some(vec![]);
        assert!(brief.research_instruction().contains("None specified"));
    }

    #[test]
    fn test_summary_lists_questions() {
        let brief = sample_brief();
        let summary = brief.summary();

        assert!(summary.contains("**Topic:** Rust async runtimes"));
        assert!(summary.contains("- How does tokio's scheduler work?"));
    }

    #[test]
    fn test_depth_serde_lowercase() {
        let json = serde_json::to_string(&DepthLevel::Deep).unwrap();
        assert_eq!(json, r#""deep""#);

        let parsed: DepthLevel = serde_json::from_str(r#""surface""#).unwrap();
        assert_eq!(parsed, DepthLevel::Surface);
    }

    #[test]
    fn test_brief_deserializes_with_defaults() {
        let brief: ResearchBrief = serde_json::from_str(
            r#"{
                "topic": "Solar power",
                "scope": "Residential",
                "audience": "Homeowners",
                "key_questions": ["Is it cost effective?"]
            }"#,
        )
        .unwrap();

        assert_eq!(brief.depth, DepthLevel::Moderate);
        assert!(brief.constraints.is_none());
    }

    #[test]
    fn test_is_actionable() {
        let brief = sample_brief();
        assert!(brief.is_actionable());

        let mut empty_topic = brief.clone();
        empty_topic.topic = "  ".to_string();
        assert!(!empty_topic.is_actionable());

        let mut no_questions = brief;
        no_questions.key_questions = vec!["   ".to_string()];
        assert!(!no_questions.is_actionable());
    }
}
