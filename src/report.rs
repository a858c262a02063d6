//! Final report assembly and persistence.
//!
//! The report concatenates the brief header and the researcher's findings in
//! full; previews exist only for display and never feed back into the data.

use std::fs;
use std::path::Path;

use chrono::Utc;

use crate::brief::ResearchBrief;
use crate::error::AgentError;

/// The assembled end product of a session.
#[derive(Debug, Clone)]
pub struct Report {
    pub brief: ResearchBrief,
    pub body: String,
}

impl Report {
    pub fn new(brief: ResearchBrief, body: impl Into<String>) -> Self {
        Self {
            brief,
            body: body.into(),
        }
    }

    /// Render the full report: title, date, brief summary, findings.
    /// Nothing is truncated here.
    pub fn to_markdown(&self) -> String {
        format!(
            "# Research Report: {topic}\n\n\
             _Generated {date}_\n\n\
             ## Brief\n\n{summary}\n\n\
             ## Findings\n\n{body}\n",
            topic = self.brief.topic,
            date = Utc::now().format("%Y-%m-%d"),
            summary = self.brief.summary(),
            body = self.body,
        )
    }

    /// Display-only preview of the findings, truncated on a char boundary.
    pub fn preview(&self, max_chars: usize) -> String {
        let mut chars = self.body.char_indices();
        match chars.nth(max_chars) {
            Some((idx, _)) => format!("{}...", &self.body[..idx]),
            None => self.body.clone(),
        }
    }

    /// Write the full report to disk.
    pub fn save(&self, path: &Path) -> Result<(), AgentError> {
        fs::write(path, self.to_markdown()).map_err(|source| AgentError::ReportIo {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brief::DepthLevel;

    fn sample_brief() -> ResearchBrief {
        ResearchBrief {
            topic: "Desalination".to_string(),
            scope: "Municipal plants".to_string(),
            depth: DepthLevel::Moderate,
            audience: "City planners".to_string(),
            key_questions: vec!["What does it cost per liter?".to_string()],
            constraints: None,
        }
    }

    #[test]
    fn test_markdown_contains_full_body() {
        let body = "finding ".repeat(500);
        let report = Report::new(sample_brief(), body.clone());

        let rendered = report.to_markdown();
        assert!(rendered.contains(&body));
        assert!(rendered.contains("# Research Report: Desalination"));
        assert!(rendered.contains("What does it cost per liter?"));
    }

    #[test]
    fn test_preview_truncates_display_only() {
        let report = Report::new(sample_brief(), "abcdefghij");

        assert_eq!(report.preview(4), "abcd...");
        assert_eq!(report.preview(10), "abcdefghij");
        assert_eq!(report.preview(100), "abcdefghij");

        // The underlying body is untouched.
        assert_eq!(report.body, "abcdefghij");
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        let report = Report::new(sample_brief(), "héllo wörld");
        // Must not panic on a multibyte boundary.
        let preview = report.preview(2);
        assert_eq!(preview, "hé...");
    }

    #[test]
    fn test_save_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.md");

        let report = Report::new(sample_brief(), "The findings.");
        report.save(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("The findings."));
        assert!(written.contains("# Research Report: Desalination"));
    }

    #[test]
    fn test_save_error_names_path() {
        let report = Report::new(sample_brief(), "body");
        let err = report
            .save(Path::new("/nonexistent-dir/report.md"))
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent-dir/report.md"));
    }
}
