//! Task model shared by the store, the projection and the sync layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "To Do")]
    ToDo,
    /// Older backend data spells this "In process".
    #[serde(rename = "In Progress", alias = "In process")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::ToDo, TaskStatus::InProgress, TaskStatus::Completed];

    /// Wire/display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::ToDo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }

    /// Lenient parse: case-insensitive, trims whitespace, accepts "In process".
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "to do" | "todo" => Some(TaskStatus::ToDo),
            "in progress" | "in process" => Some(TaskStatus::InProgress),
            "completed" => Some(TaskStatus::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown status '{0}' (expected To Do, In Progress or Completed)")]
pub struct UnknownStatus(pub String);

impl FromStr for TaskStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::parse(s).ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// A task record as held by the store and sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub status: TaskStatus,

    /// Creation date, usually `YYYY-MM-DD`. Kept as the backend sent it.
    #[serde(default)]
    pub date: String,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            status: TaskStatus::ToDo,
            date: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }
}

/// Raw form input for creating or editing a task, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub status: String,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            status: TaskStatus::ToDo.as_str().to_string(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Prefill a draft from an existing task (edit form).
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_with_display_names() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");

        let legacy: TaskStatus = serde_json::from_str("\"In process\"").unwrap();
        assert_eq!(legacy, TaskStatus::InProgress);
    }

    #[test]
    fn status_parse_is_lenient() {
        assert_eq!(TaskStatus::parse("  to do "), Some(TaskStatus::ToDo));
        assert_eq!(TaskStatus::parse("COMPLETED"), Some(TaskStatus::Completed));
        assert_eq!(TaskStatus::parse("In process"), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::parse("blocked"), None);
        assert!("blocked".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn task_json_omits_missing_description() {
        let t = Task::new("a1", "Write docs").with_date("2024-01-01");
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v["id"], "a1");
        assert_eq!(v["status"], "To Do");
        assert!(v.get("description").is_none());
    }

    #[test]
    fn draft_from_task_round_trips_editable_fields() {
        let t = Task::new("a1", "Write docs")
            .with_description("all of them")
            .with_status(TaskStatus::Completed);
        let d = TaskDraft::from_task(&t);
        assert_eq!(d.title, "Write docs");
        assert_eq!(d.description.as_deref(), Some("all of them"));
        assert_eq!(d.status, "Completed");
    }
}
