//! Scripted in-memory `TaskApi` for controller tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use taskboard_core::Task;
use taskboard_sync::{ApiError, ErrorBody, RemoteId, RemoteTask, TaskApi};
use tokio::sync::oneshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Create(Task),
    Update(Task),
    Delete(String),
}

pub enum ListReply {
    Ready(Result<Vec<RemoteTask>, ApiError>),
    Wait(oneshot::Receiver<Result<Vec<RemoteTask>, ApiError>>),
}

/// Replies are consumed in order; an empty queue answers with success
/// (an empty list for GET, no echo for POST).
#[derive(Default)]
pub struct ScriptedApi {
    calls: Mutex<Vec<Call>>,
    list: Mutex<VecDeque<ListReply>>,
    create: Mutex<VecDeque<Result<Option<RemoteTask>, ApiError>>>,
    update: Mutex<VecDeque<Result<(), ApiError>>>,
    delete: Mutex<VecDeque<Result<(), ApiError>>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn push_list(&self, reply: Result<Vec<RemoteTask>, ApiError>) {
        self.list.lock().unwrap().push_back(ListReply::Ready(reply));
    }

    /// GET that stays in flight until the returned sender answers it.
    pub fn push_list_pending(&self) -> oneshot::Sender<Result<Vec<RemoteTask>, ApiError>> {
        let (tx, rx) = oneshot::channel();
        self.list.lock().unwrap().push_back(ListReply::Wait(rx));
        tx
    }

    pub fn push_create(&self, reply: Result<Option<RemoteTask>, ApiError>) {
        self.create.lock().unwrap().push_back(reply);
    }

    pub fn push_update(&self, reply: Result<(), ApiError>) {
        self.update.lock().unwrap().push_back(reply);
    }

    pub fn push_delete(&self, reply: Result<(), ApiError>) {
        self.delete.lock().unwrap().push_back(reply);
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl TaskApi for ScriptedApi {
    async fn list_tasks(&self) -> Result<Vec<RemoteTask>, ApiError> {
        self.record(Call::List);
        let reply = self.list.lock().unwrap().pop_front();
        match reply {
            None => Ok(vec![]),
            Some(ListReply::Ready(r)) => r,
            Some(ListReply::Wait(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(ApiError::Transport("request dropped".into()))),
        }
    }

    async fn create_task(&self, task: &Task) -> Result<Option<RemoteTask>, ApiError> {
        self.record(Call::Create(task.clone()));
        let reply = self.create.lock().unwrap().pop_front();
        reply.unwrap_or(Ok(None))
    }

    async fn update_task(&self, task: &Task) -> Result<(), ApiError> {
        self.record(Call::Update(task.clone()));
        let reply = self.update.lock().unwrap().pop_front();
        reply.unwrap_or(Ok(()))
    }

    async fn delete_task(&self, id: &str) -> Result<(), ApiError> {
        self.record(Call::Delete(id.to_string()));
        let reply = self.delete.lock().unwrap().pop_front();
        reply.unwrap_or(Ok(()))
    }
}

pub fn remote(id: &str, title: &str, date: &str) -> RemoteTask {
    RemoteTask {
        id: Some(RemoteId::Text(id.to_string())),
        title: Some(title.to_string()),
        description: None,
        status: Some("To Do".to_string()),
        date: Some(date.to_string()),
    }
}

pub fn server_message(status: u16, message: &str) -> ApiError {
    ApiError::Rejected {
        status,
        body: ErrorBody::with_message(message),
    }
}

pub fn server_field_error(field: &str, message: &str) -> ApiError {
    ApiError::Rejected {
        status: 422,
        body: ErrorBody::with_errors([(field, message)]),
    }
}
