//! Core domain logic for the todo tracker.
//! This crate is the single source of truth for record invariants.

pub mod db;
pub mod form;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use form::todo_form::{
    field_spec, FieldSpec, FormData, FormErrors, TodoForm, Widget, TODO_FORM_FIELDS,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::todo::{
    is_overdue, today_utc, Todo, TodoDraft, TodoId, TodoValidationError, TITLE_MAX_CHARS,
};
pub use repo::todo_repo::{
    RepoError, RepoResult, SqliteTodoRepository, TodoListQuery, TodoRepository,
};
pub use service::todo_service::{ServiceResult, TodoService, TodoServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
