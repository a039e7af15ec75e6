//! Local task store: the canonical in-memory task list plus fetch status.
//!
//! Design:
//! - State changes only through `Action`s applied by the pure `reduce`.
//! - `tasks` keeps insertion/fetch order; display order is the projection's job.
//! - Ids are unique at all times. Inserting a known id replaces in place, bulk
//!   loads keep the first occurrence.
//! - Fetch completions carry the request number they answer; anything other
//!   than the latest started fetch is stale and ignored.

use crate::task::{Task, TaskStatus};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreState {
    pub tasks: Vec<Task>,
    pub loading: bool,
    pub error: Option<String>,
    /// Request number of the most recently started fetch (0 = none yet).
    pub latest_fetch: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    AddTask(Task),
    RemoveTask(String),
    EditTask(Task),
    ReplaceAll(Vec<Task>),
    /// Re-insert a task at `index` (clamped). Used to undo a removal.
    RestoreTask { index: usize, task: Task },
    /// Swap a client-generated id for the one the server assigned.
    ReconcileId { local_id: String, task: Task },
    FetchStart { request: u64 },
    FetchSucceeded { request: u64, tasks: Vec<Task> },
    FetchFailed { request: u64, message: String },
}

/// Pure reducer: (state, action) -> state.
pub fn reduce(mut state: StoreState, action: &Action) -> StoreState {
    match action {
        Action::AddTask(task) => {
            match position(&state.tasks, &task.id) {
                Some(i) => state.tasks[i] = task.clone(),
                None => state.tasks.push(task.clone()),
            }
        }
        Action::RemoveTask(id) => {
            state.tasks.retain(|t| &t.id != id);
        }
        Action::EditTask(task) => {
            if let Some(i) = position(&state.tasks, &task.id) {
                state.tasks[i] = task.clone();
            }
        }
        Action::ReplaceAll(tasks) => {
            state.tasks = dedup_by_id(tasks);
        }
        Action::RestoreTask { index, task } => match position(&state.tasks, &task.id) {
            Some(i) => state.tasks[i] = task.clone(),
            None => {
                let at = (*index).min(state.tasks.len());
                state.tasks.insert(at, task.clone());
            }
        },
        Action::ReconcileId { local_id, task } => {
            if let Some(i) = position(&state.tasks, local_id) {
                let clash = state
                    .tasks
                    .iter()
                    .enumerate()
                    .any(|(j, t)| j != i && t.id == task.id);
                if clash {
                    state.tasks.remove(i);
                } else {
                    state.tasks[i] = task.clone();
                }
            }
        }
        Action::FetchStart { request } => {
            state.latest_fetch = state.latest_fetch.max(*request);
            state.loading = true;
            state.error = None;
        }
        Action::FetchSucceeded { request, tasks } => {
            if *request == state.latest_fetch {
                state.loading = false;
                state.tasks = dedup_by_id(tasks);
            }
        }
        Action::FetchFailed { request, message } => {
            if *request == state.latest_fetch {
                state.loading = false;
                state.error = Some(message.clone());
            }
        }
    }
    state
}

fn position(tasks: &[Task], id: &str) -> Option<usize> {
    tasks.iter().position(|t| t.id == id)
}

fn dedup_by_id(tasks: &[Task]) -> Vec<Task> {
    let mut seen = HashSet::new();
    tasks
        .iter()
        .filter(|t| seen.insert(t.id.as_str()))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    state: StoreState,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let mut store = Self::new();
        store.replace_all(tasks);
        store
    }

    pub fn dispatch(&mut self, action: Action) {
        self.state = reduce(std::mem::take(&mut self.state), &action);
    }

    pub fn add_task(&mut self, task: Task) {
        self.dispatch(Action::AddTask(task));
    }

    pub fn remove_task(&mut self, id: &str) {
        self.dispatch(Action::RemoveTask(id.to_string()));
    }

    pub fn edit_task(&mut self, task: Task) {
        self.dispatch(Action::EditTask(task));
    }

    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        self.dispatch(Action::ReplaceAll(tasks));
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn tasks(&self) -> &[Task] {
        &self.state.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.state.tasks.iter().find(|t| t.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        position(&self.state.tasks, id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.state.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.tasks.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.state.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    /// Number of tasks per status; statuses with no tasks report 0.
    pub fn counts_by_status(&self) -> BTreeMap<TaskStatus, usize> {
        let mut counts: BTreeMap<TaskStatus, usize> =
            TaskStatus::ALL.iter().map(|s| (*s, 0)).collect();
        for t in &self.state.tasks {
            *counts.entry(t.status).or_default() += 1;
        }
        counts
    }
}
