//! taskboard-core: task model, validation, local store and list projection.
//!
//! Everything here is synchronous and free of I/O; the sync crate drives it.

pub mod store;
pub mod task;
pub mod validation;
pub mod view;

pub use store::{reduce, Action, StoreState, TaskStore};
pub use task::{Task, TaskDraft, TaskStatus, UnknownStatus};
pub use validation::{validate, FieldErrors, ValidTask};
pub use view::{
    project, SortConfig, SortDirection, SortKey, SortState, StatusFilter, ViewState,
};
