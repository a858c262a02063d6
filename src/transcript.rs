//! The conversation transcript for a session.
//!
//! An append-only, ordered record of role-tagged utterances. The transcript is
//! owned by the session and converted on demand into rig chat history (for the
//! clarification dialogue) or rendered as plain text (for extraction prompts).

use rig::completion::Message;
use serde::{Deserialize, Serialize};

/// Who said what.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    fn label(&self) -> &'static str {
        match self {
            Role::System => "System",
            Role::User => "User",
            Role::Assistant => "Assistant",
            Role::Tool => "Tool",
        }
    }
}

/// A single transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub role: Role,
    pub content: String,
}

/// Ordered, append-only conversation record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    entries: Vec<Utterance>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(Role::User, content);
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(Role::Assistant, content);
    }

    pub fn push_system(&mut self, content: impl Into<String>) {
        self.push(Role::System, content);
    }

    #[allow(dead_code)] // tool outputs currently stay inside the rig loop
    pub fn push_tool(&mut self, content: impl Into<String>) {
        self.push(Role::Tool, content);
    }

    fn push(&mut self, role: Role, content: impl Into<String>) {
        self.entries.push(Utterance {
            role,
            content: content.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[Utterance] {
        &self.entries
    }

    /// Number of user turns so far. Used as the clarification round counter.
    pub fn user_turns(&self) -> usize {
        self.entries.iter().filter(|u| u.role == Role::User).count()
    }

    pub fn last_user(&self) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|u| u.role == Role::User)
            .map(|u| u.content.as_str())
    }

    pub fn last_assistant(&self) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|u| u.role == Role::Assistant)
            .map(|u| u.content.as_str())
    }

    /// Split the transcript into rig chat history plus the latest user message
    /// as the prompt. System entries are carried by the agent preamble and tool
    /// entries never enter the clarification dialogue, so both are skipped.
    ///
    /// Returns `None` when no user utterance exists yet.
    pub fn history_and_prompt(&self) -> Option<(Vec<Message>, String)> {
        let last_user_idx = self
            .entries()
            .iter()
            .rposition(|u| u.role == Role::User)?;

        let history = self.entries()[..last_user_idx]
            .iter()
            .filter_map(|u| match u.role {
                Role::User => Some(Message::user(u.content.clone())),
                Role::Assistant => Some(Message::assistant(u.content.clone())),
                Role::System | Role::Tool => None,
            })
            .collect();

        Some((history, self.entries[last_user_idx].content.clone()))
    }

    /// Render the conversation as labeled text for extraction prompts.
    pub fn rendered(&self) -> String {
        self.entries()
            .iter()
            .map(|u| format!("{}: {}", u.role.label(), u.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Transcript {
        let mut t = Transcript::new();
        t.push_assistant("What topic should I research?");
        t.push_user("Rust async runtimes");
        t.push_assistant("Any particular audience?");
        t.push_user("Engineers new to Rust");
        t
    }

    #[test]
    fn test_append_preserves_order() {
        let t = sample();
        assert_eq!(t.len(), 4);
        assert_eq!(t.entries()[0].role, Role::Assistant);
        assert_eq!(t.entries()[1].content, "Rust async runtimes");
    }

    #[test]
    fn test_user_turns_counts_only_users() {
        let t = sample();
        assert_eq!(t.user_turns(), 2);

        let mut t = t;
        t.push_system("note");
        t.push_tool("result");
        assert_eq!(t.user_turns(), 2);
    }

    #[test]
    fn test_last_user_and_assistant() {
        let t = sample();
        assert_eq!(t.last_user(), Some("Engineers new to Rust"));
        assert_eq!(t.last_assistant(), Some("Any particular audience?"));
    }

    #[test]
    fn test_empty_transcript() {
        let t = Transcript::new();
        assert!(t.is_empty());
        assert_eq!(t.last_user(), None);
        assert!(t.history_and_prompt().is_none());
        assert_eq!(t.rendered(), "");
    }

    #[test]
    fn test_history_and_prompt_splits_last_user() {
        let t = sample();
        let (history, prompt) = t.history_and_prompt().unwrap();

        assert_eq!(prompt, "Engineers new to Rust");
        // Greeting, first user turn, second question - latest user turn is the prompt.
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_history_skips_system_and_tool_entries() {
        let mut t = sample();
        t.push_system("internal note");
        t.push_tool("raw tool output");
        t.push_user("final answer");

        let (history, prompt) = t.history_and_prompt().unwrap();
        assert_eq!(prompt, "final answer");
        assert_eq!(history.len(), 4);
    }

    #[test]
    fn test_rendered_labels_roles() {
        let t = sample();
        let text = t.rendered();
        assert!(text.contains("User: Rust async runtimes"));
        assert!(text.contains("Assistant: Any particular audience?"));
    }
}
