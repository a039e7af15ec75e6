//! Form validation gate. Runs before any store mutation or network call.

use crate::task::{TaskDraft, TaskStatus};
use std::collections::BTreeMap;
use std::fmt;

pub const TITLE_MIN_CHARS: usize = 3;
pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// Field name -> message. Ordered so output is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the first message reported for a field.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut errors = FieldErrors::new();
        for (field, message) in iter {
            errors.insert(field, message);
        }
        errors
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Draft that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
}

pub fn validate(draft: &TaskDraft) -> Result<ValidTask, FieldErrors> {
    let mut errors = FieldErrors::new();

    let title_len = draft.title.chars().count();
    if draft.title.trim().is_empty() {
        errors.insert("title", "Task name is required");
    } else if title_len < TITLE_MIN_CHARS {
        errors.insert("title", format!("title must be at least {TITLE_MIN_CHARS} characters"));
    } else if title_len > TITLE_MAX_CHARS {
        errors.insert("title", format!("title must be at most {TITLE_MAX_CHARS} characters"));
    }

    let description = draft.description.as_deref().filter(|d| !d.is_empty());
    if let Some(d) = description {
        if d.chars().count() > DESCRIPTION_MAX_CHARS {
            errors.insert(
                "description",
                format!("description must be at most {DESCRIPTION_MAX_CHARS} characters"),
            );
        }
    }

    let status = if draft.status.trim().is_empty() {
        errors.insert("status", "Status is required");
        None
    } else {
        let parsed = TaskStatus::parse(&draft.status);
        if parsed.is_none() {
            errors.insert("status", "status must be one of: To Do, In Progress, Completed");
        }
        parsed
    };

    match status {
        Some(status) if errors.is_empty() => Ok(ValidTask {
            title: draft.title.clone(),
            description: description.map(str::to_string),
            status,
        }),
        _ => Err(errors),
    }
}
