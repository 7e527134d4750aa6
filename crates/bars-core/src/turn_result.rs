use std::time::Duration;

use crate::project::ProjectReport;

/// Result of one conversational turn: what to show the user and whether the
/// turn made it into memory.
#[derive(Debug, Clone)]
pub struct TurnResult {
    /// Text to print, including any project and execution report.
    pub response: String,
    /// The cleaned model reply alone.
    pub reply: String,
    /// False when the model failed or timed out and nothing was stored.
    pub persisted: bool,
    pub project: Option<ProjectReport>,
    pub elapsed: Duration,
}

impl TurnResult {
    pub fn completed(
        reply: String,
        response: String,
        project: Option<ProjectReport>,
        elapsed: Duration,
    ) -> Self {
        Self {
            response,
            reply,
            persisted: true,
            project,
            elapsed,
        }
    }

    pub fn failed(message: String, elapsed: Duration) -> Self {
        Self {
            reply: message.clone(),
            response: message,
            persisted: false,
            project: None,
            elapsed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_reply_excludes_project_report() {
        let report = ProjectReport {
            name: "snake_game".to_string(),
            path: PathBuf::from("/tmp/projects/snake_game"),
            created: vec![],
            skipped: vec![],
        };
        let response = format!("Here you go!\n\n{}", report);
        let result = TurnResult::completed(
            "Here you go!".to_string(),
            response,
            Some(report),
            Duration::from_secs(1),
        );
        assert_eq!(result.reply, "Here you go!");
        assert!(result.persisted);
    }

    #[test]
    fn test_failed_is_not_persisted() {
        let result = TurnResult::failed("⏰ Response timeout".to_string(), Duration::ZERO);
        assert!(!result.persisted);
        assert!(result.project.is_none());
        assert_eq!(result.reply, "⏰ Response timeout");
    }
}
