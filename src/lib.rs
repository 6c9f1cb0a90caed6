//! Terminal client for a single-board task tracker backed by a REST API.
//!
//! Tasks are fetched from the `tasks` resource, cached in a [`KanbanBoard`],
//! and shown in three status columns. The [`Controller`] turns user input into
//! API calls and patches the cache with the server's answers.

pub mod api;
pub mod bindings;
pub mod config;
pub mod controller;
pub mod error;
pub mod kanban_board;
pub mod render;
pub mod task;
pub mod ui;

pub use api::{HttpTaskApi, TaskApi};
pub use config::ClientConfig;
pub use controller::Controller;
pub use error::{ClientError, Result};
pub use kanban_board::KanbanBoard;
pub use task::{Status, Task, TaskId, TaskPatch};
