//! Sync controller: optimistic mutations against the local store, confirmed
//! or rolled back by the remote resource.
//!
//! Protocol per mutation:
//! 1. validate the draft (create/edit); failures never touch store or network
//! 2. apply the change to the store
//! 3. issue POST / PUT / DELETE
//! 4. on failure restore the pre-mutation value and surface the error;
//!    on success run the caller's completion callback
//!
//! The store lock is only taken for a single dispatch or read, never across an
//! `.await`, so overlapping operations interleave at network boundaries only.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use taskboard_core::{validate, Action, FieldErrors, Task, TaskDraft, TaskStore};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::{ApiError, TaskApi};
use crate::dto::{map_tasks, RemoteTask};

const SUBMISSION_FAILED: &str = "Submission failed";
const FETCH_FAILED: &str = "Failed to fetch";

/// Store handle shared between the controller and whoever renders it.
#[derive(Debug, Clone, Default)]
pub struct SharedStore(Arc<Mutex<TaskStore>>);

impl SharedStore {
    pub fn new(store: TaskStore) -> Self {
        Self(Arc::new(Mutex::new(store)))
    }

    fn lock(&self) -> MutexGuard<'_, TaskStore> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn dispatch(&self, action: Action) {
        self.lock().dispatch(action);
    }

    pub fn read<R>(&self, f: impl FnOnce(&TaskStore) -> R) -> R {
        f(&*self.lock())
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut TaskStore) -> R) -> R {
        f(&mut *self.lock())
    }

    pub fn snapshot(&self) -> TaskStore {
        self.lock().clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("invalid input: {0}")]
    Validation(FieldErrors),

    #[error("rejected by server: {0}")]
    Rejected(FieldErrors),

    #[error("{0}")]
    Failed(String),

    #[error("{0}")]
    Transport(String),

    #[error("no task with id '{0}'")]
    UnknownTask(String),
}

impl SubmitError {
    /// Per-field messages, for client or server validation failures.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            SubmitError::Validation(f) | SubmitError::Rejected(f) => Some(f),
            _ => None,
        }
    }

    /// Form-level message, for everything that isn't tied to a field.
    pub fn form_message(&self) -> Option<String> {
        match self {
            SubmitError::Validation(_) | SubmitError::Rejected(_) => None,
            other => Some(other.to_string()),
        }
    }
}

impl From<ApiError> for SubmitError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Rejected { body, .. } => match body.field_errors() {
                Some(fields) => SubmitError::Rejected(fields),
                None => SubmitError::Failed(
                    body.message
                        .filter(|m| !m.is_empty())
                        .unwrap_or_else(|| SUBMISSION_FAILED.to_string()),
                ),
            },
            ApiError::Transport(m) | ApiError::Config(m) => SubmitError::Transport(m),
            ApiError::Decode(m) => SubmitError::Failed(m),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The list was replaced with this many tasks.
    Loaded(usize),
    /// The store's error was set; tasks were left as they were.
    Failed(String),
    /// A newer fetch started before this one finished; its result was dropped.
    Superseded,
}

fn fetch_error_message(err: &ApiError) -> String {
    match err {
        ApiError::Rejected { .. } => FETCH_FAILED.to_string(),
        other => other.to_string(),
    }
}

/// Creation date stamped on new tasks.
pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

pub struct SyncController<A> {
    api: A,
    store: SharedStore,
    fetch_seq: AtomicU64,
}

impl<A: TaskApi> SyncController<A> {
    pub fn new(api: A, store: SharedStore) -> Self {
        let last = store.read(|s| s.state().latest_fetch);
        Self {
            api,
            store,
            fetch_seq: AtomicU64::new(last),
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Load the task list. Only the most recently started fetch may land.
    pub async fn fetch_tasks(&self) -> FetchOutcome {
        let request = self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.store.dispatch(Action::FetchStart { request });
        debug!(request, "fetch started");

        let (action, outcome) = match self.api.list_tasks().await {
            Ok(remote) => {
                let tasks = map_tasks(remote);
                let n = tasks.len();
                (Action::FetchSucceeded { request, tasks }, FetchOutcome::Loaded(n))
            }
            Err(err) => {
                let message = fetch_error_message(&err);
                warn!(request, error = %err, "fetch failed");
                (
                    Action::FetchFailed { request, message: message.clone() },
                    FetchOutcome::Failed(message),
                )
            }
        };

        let stale = self.store.update(|s| {
            let stale = s.state().latest_fetch != request;
            s.dispatch(action);
            stale
        });
        if stale {
            debug!(request, "fetch superseded, result dropped");
            return FetchOutcome::Superseded;
        }
        outcome
    }

    pub async fn create_task<F>(&self, draft: &TaskDraft, on_success: F) -> Result<Task, SubmitError>
    where
        F: FnOnce(&Task),
    {
        let valid = validate(draft).map_err(SubmitError::Validation)?;

        let task = Task {
            id: self.new_local_id(),
            title: valid.title,
            description: valid.description,
            status: valid.status,
            date: today(),
        };

        self.store.dispatch(Action::AddTask(task.clone()));
        debug!(id = %task.id, "optimistic add");

        match self.api.create_task(&task).await {
            Ok(echo) => {
                let task = self.reconcile_id(task, echo);
                on_success(&task);
                Ok(task)
            }
            Err(err) => {
                warn!(id = %task.id, error = %err, "create failed, removing optimistic task");
                self.store.dispatch(Action::RemoveTask(task.id.clone()));
                Err(err.into())
            }
        }
    }

    /// Edit title/description/status of a task. Id and date are kept.
    pub async fn edit_task<F>(
        &self,
        id: &str,
        draft: &TaskDraft,
        on_success: F,
    ) -> Result<Task, SubmitError>
    where
        F: FnOnce(&Task),
    {
        let valid = validate(draft).map_err(SubmitError::Validation)?;
        let prior = self
            .store
            .read(|s| s.get(id).cloned())
            .ok_or_else(|| SubmitError::UnknownTask(id.to_string()))?;

        let updated = Task {
            title: valid.title,
            description: valid.description,
            status: valid.status,
            ..prior.clone()
        };

        self.store.dispatch(Action::EditTask(updated.clone()));
        debug!(id, "optimistic edit");

        match self.api.update_task(&updated).await {
            Ok(()) => {
                on_success(&updated);
                Ok(updated)
            }
            Err(err) => {
                warn!(id, error = %err, "edit failed, restoring previous value");
                self.store.dispatch(Action::EditTask(prior));
                Err(err.into())
            }
        }
    }

    /// Remove a task; on failure it is put back where it was.
    pub async fn delete_task<F>(&self, id: &str, on_success: F) -> Result<Task, SubmitError>
    where
        F: FnOnce(&Task),
    {
        let (index, prior) = self
            .store
            .read(|s| s.position(id).map(|i| (i, s.tasks()[i].clone())))
            .ok_or_else(|| SubmitError::UnknownTask(id.to_string()))?;

        self.store.dispatch(Action::RemoveTask(id.to_string()));
        debug!(id, "optimistic delete");

        match self.api.delete_task(id).await {
            Ok(()) => {
                on_success(&prior);
                Ok(prior)
            }
            Err(err) => {
                warn!(id, error = %err, "delete failed, restoring task");
                self.store.dispatch(Action::RestoreTask { index, task: prior });
                Err(err.into())
            }
        }
    }

    /// Short random id, regenerated until it doesn't clash with the store.
    fn new_local_id(&self) -> String {
        loop {
            let mut id = Uuid::new_v4().simple().to_string();
            id.truncate(8);
            if !self.store.read(|s| s.contains(&id)) {
                return id;
            }
        }
    }

    fn reconcile_id(&self, task: Task, echo: Option<RemoteTask>) -> Task {
        let Some(server_id) = echo.and_then(|r| r.id()).filter(|id| !id.is_empty()) else {
            return task;
        };
        if server_id == task.id {
            return task;
        }

        info!(local = %task.id, server = %server_id, "adopting server-assigned id");
        let local_id = task.id.clone();
        let reconciled = Task { id: server_id, ..task };
        self.store.dispatch(Action::ReconcileId {
            local_id,
            task: reconciled.clone(),
        });
        reconciled
    }
}
