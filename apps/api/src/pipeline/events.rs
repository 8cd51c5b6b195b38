use serde::{Deserialize, Serialize};

use crate::models::ScoutReport;

/// One entry on a run's progress stream.
///
/// Wire form: `{"type":"step","content":"..."}`, `{"type":"result","content":{..report..}}`,
/// `{"type":"error","content":"..."}`. A run emits any number of steps followed by exactly
/// one `result` or `error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum ProgressEvent {
    Step(String),
    Result(ScoutReport),
    Error(String),
}

impl ProgressEvent {
    pub fn step(description: impl Into<String>) -> Self {
        Self::Step(description.into())
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Step(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_step_wire_format() {
        let value = serde_json::to_value(ProgressEvent::step("Scoring 4 listings")).unwrap();
        assert_eq!(value, json!({"type": "step", "content": "Scoring 4 listings"}));
    }

    #[test]
    fn test_result_wire_format() {
        let event = ProgressEvent::Result(ScoutReport {
            summary: "Found 0 matching jobs".to_string(),
            jobs: vec![],
        });
        let value = serde_json::to_value(event).unwrap();
        assert_eq!(value["type"], "result");
        assert_eq!(value["content"]["summary"], "Found 0 matching jobs");
        assert_eq!(value["content"]["jobs"], json!([]));
    }

    #[test]
    fn test_error_wire_format_and_terminality() {
        let event = ProgressEvent::Error("boom".to_string());
        assert!(event.is_terminal());
        assert!(!ProgressEvent::step("x").is_terminal());
        assert_eq!(
            serde_json::to_value(event).unwrap(),
            json!({"type": "error", "content": "boom"})
        );
    }
}
