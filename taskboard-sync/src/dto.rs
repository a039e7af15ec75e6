//! Wire shapes for records coming back from the task resource.

use serde::Deserialize;
use serde_json::Value;
use taskboard_core::{Task, TaskStatus};
use tracing::warn;

/// json-server style backends hand out numeric ids, others strings.
/// Anything else lands in `Other` so one odd record can't fail the whole list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RemoteId {
    Text(String),
    Number(i64),
    Other(Value),
}

impl RemoteId {
    /// None for ids that aren't a string or an integer.
    pub fn into_string(self) -> Option<String> {
        match self {
            RemoteId::Text(s) => Some(s),
            RemoteId::Number(n) => Some(n.to_string()),
            RemoteId::Other(Value::Number(n)) if n.is_u64() => Some(n.to_string()),
            RemoteId::Other(_) => None,
        }
    }
}

/// A task as the backend returns it. Every field is optional on the wire;
/// unknown fields (e.g. `completed`) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RemoteTask {
    pub id: Option<RemoteId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub date: Option<String>,
}

impl RemoteTask {
    pub fn id(&self) -> Option<String> {
        self.id.clone().and_then(RemoteId::into_string)
    }

    /// Map into the local shape. None when the record has no usable id.
    pub fn into_task(self) -> Option<Task> {
        let id = self.id.and_then(RemoteId::into_string).filter(|id| !id.is_empty())?;
        let status = self
            .status
            .as_deref()
            .and_then(TaskStatus::parse)
            .unwrap_or(TaskStatus::ToDo);

        Some(Task {
            id,
            title: self.title.unwrap_or_default(),
            description: self.description.filter(|d| !d.is_empty()),
            status,
            date: self.date.unwrap_or_default(),
        })
    }
}

/// Map a fetched list, dropping records without an id.
pub fn map_tasks(remote: Vec<RemoteTask>) -> Vec<Task> {
    let total = remote.len();
    let tasks: Vec<Task> = remote.into_iter().filter_map(RemoteTask::into_task).collect();
    if tasks.len() < total {
        warn!(dropped = total - tasks.len(), "ignoring fetched tasks without an id");
    }
    tasks
}
