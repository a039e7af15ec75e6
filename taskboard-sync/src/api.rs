//! Remote task resource contract.
//!
//! `TaskApi` is the seam between the controller and the network: the HTTP
//! client implements it for real, tests implement it with scripted replies.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::future::Future;
use taskboard_core::{FieldErrors, Task};
use thiserror::Error;

use crate::dto::RemoteTask;

pub trait TaskApi: Send + Sync {
    /// `GET /tasks`
    fn list_tasks(&self) -> impl Future<Output = Result<Vec<RemoteTask>, ApiError>> + Send;

    /// `POST /tasks`. Returns the created record when the server echoes one.
    fn create_task(
        &self,
        task: &Task,
    ) -> impl Future<Output = Result<Option<RemoteTask>, ApiError>> + Send;

    /// `PUT /tasks/:id`
    fn update_task(&self, task: &Task) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `DELETE /tasks/:id`
    fn delete_task(&self, id: &str) -> impl Future<Output = Result<(), ApiError>> + Send;
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid base url: {0}")]
    Config(String),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("server returned {status}")]
    Rejected { status: u16, body: ErrorBody },

    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Body of a non-2xx response: `{ errors: { field: message } }` or `{ message }`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub errors: Option<BTreeMap<String, serde_json::Value>>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self { errors: None, message: Some(message.into()) }
    }

    pub fn with_errors<I, K, V>(errors: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = errors
            .into_iter()
            .map(|(k, v)| (k.into(), serde_json::Value::String(v.into())))
            .collect();
        Self { errors: Some(map), message: None }
    }

    /// Field-level errors, if the body carried a non-empty `errors` map.
    pub fn field_errors(&self) -> Option<FieldErrors> {
        let errors = self.errors.as_ref().filter(|e| !e.is_empty())?;
        Some(
            errors
                .iter()
                .map(|(field, value)| {
                    let message = match value {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (field.clone(), message)
                })
                .collect(),
        )
    }
}

/// Lenient decode: anything that isn't the documented JSON shape is an empty body.
pub fn parse_error_body(text: &str) -> ErrorBody {
    serde_json::from_str(text).unwrap_or_default()
}
