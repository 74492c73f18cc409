use serde::{Deserialize, Serialize};

/// A task as the task service reports it.
///
/// `date` is the `YYYY-MM-DD` day key the task belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    pub date: String,
    #[serde(default)]
    pub created_at: String,
}

impl Task {
    pub fn symbol(&self) -> &'static str {
        if self.completed { "✓" } else { "☐" }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quicklink {
    pub id: i64,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub created_at: String,
}

/// Body of a successful toggle: the state the service settled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleResult {
    pub completed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_deserializes_without_created_at() {
        let task: Task =
            serde_json::from_str(r#"{"id":7,"title":"water plants","completed":true,"date":"2026-10-16"}"#)
                .unwrap();
        assert_eq!(task.id, 7);
        assert!(task.completed);
        assert!(task.created_at.is_empty());
    }

    #[test]
    fn task_symbols() {
        let mut task = Task {
            id: 1,
            title: "t".into(),
            completed: false,
            date: "2026-10-16".into(),
            created_at: String::new(),
        };
        assert_eq!(task.symbol(), "\u{2610}");
        task.completed = true;
        assert_eq!(task.symbol(), "\u{2713}");
    }

    #[test]
    fn toggle_result_reads_completed_flag() {
        let result: ToggleResult = serde_json::from_str(r#"{"completed":false}"#).unwrap();
        assert!(!result.completed);
    }
}
