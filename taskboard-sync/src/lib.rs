//! taskboard-sync: REST client for the `/tasks` resource and the controller
//! that keeps the local store optimistically in step with it.

pub mod api;
pub mod controller;
pub mod dto;
pub mod http;

pub use api::{ApiError, ErrorBody, TaskApi};
pub use controller::{FetchOutcome, SharedStore, SubmitError, SyncController};
pub use dto::{RemoteId, RemoteTask};
pub use http::HttpTaskApi;
