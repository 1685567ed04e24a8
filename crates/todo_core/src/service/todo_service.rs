//! Todo use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD entry points that accept raw form input.
//! - Delegate persistence to an injected repository implementation.
//!
//! # Invariants
//! - Form input is validated before any repository call; a failed bind
//!   never reaches storage.
//! - Updates always replace the whole editable record.
//! - Service layer remains storage-agnostic.

use crate::form::todo_form::{FormData, FormErrors, TodoForm};
use crate::model::todo::{Todo, TodoDraft, TodoId};
use crate::repo::todo_repo::{RepoError, TodoListQuery, TodoRepository};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for todo use-cases.
#[derive(Debug)]
pub enum TodoServiceError {
    /// Submitted input failed form validation.
    Validation(FormErrors),
    /// Target record does not exist.
    TodoNotFound(TodoId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for TodoServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(errors) => write!(f, "invalid todo input: {errors}"),
            Self::TodoNotFound(id) => write!(f, "todo not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TodoServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(errors) => Some(errors),
            Self::Repo(err) => Some(err),
            Self::TodoNotFound(_) => None,
        }
    }
}

impl From<RepoError> for TodoServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::TodoNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<FormErrors> for TodoServiceError {
    fn from(value: FormErrors) -> Self {
        Self::Validation(value)
    }
}

pub type ServiceResult<T> = Result<T, TodoServiceError>;

/// Todo service facade over repository implementations.
pub struct TodoService<R: TodoRepository> {
    repo: R,
}

impl<R: TodoRepository> TodoService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates submitted input and persists a new record.
    pub fn create_todo(&self, data: &FormData) -> ServiceResult<Todo> {
        let draft = bind_draft(data, "create")?;
        self.create_from_draft(&draft)
    }

    /// Persists an already-typed draft.
    ///
    /// The repository still enforces title invariants.
    pub fn create_from_draft(&self, draft: &TodoDraft) -> ServiceResult<Todo> {
        let todo = self.repo.create_todo(draft)?;
        info!(
            "event=todo_create module=service status=ok id={} has_due_date={}",
            todo.id,
            todo.due_date.is_some()
        );
        Ok(todo)
    }

    /// Gets one record or reports it missing.
    pub fn get_todo(&self, id: TodoId) -> ServiceResult<Todo> {
        self.repo
            .get_todo(id)?
            .ok_or(TodoServiceError::TodoNotFound(id))
    }

    /// Replaces all editable fields from submitted input.
    pub fn update_todo(&self, id: TodoId, data: &FormData) -> ServiceResult<Todo> {
        let draft = bind_draft(data, "update")?;
        let todo = self.repo.update_todo(id, &draft)?;
        info!("event=todo_update module=service status=ok id={id}");
        Ok(todo)
    }

    /// Marks a record resolved or unresolved.
    ///
    /// Reads the record and writes it back whole with only the flag changed.
    pub fn set_resolved(&self, id: TodoId, resolved: bool) -> ServiceResult<Todo> {
        let current = self.get_todo(id)?;
        let draft = current.to_draft().resolved(resolved);
        let todo = self.repo.update_todo(id, &draft)?;
        info!("event=todo_set_resolved module=service status=ok id={id} resolved={resolved}");
        Ok(todo)
    }

    pub fn delete_todo(&self, id: TodoId) -> ServiceResult<()> {
        self.repo.delete_todo(id)?;
        info!("event=todo_delete module=service status=ok id={id}");
        Ok(())
    }

    pub fn list_todos(&self, query: &TodoListQuery) -> ServiceResult<Vec<Todo>> {
        Ok(self.repo.list_todos(query)?)
    }
}

fn bind_draft(data: &FormData, action: &str) -> Result<TodoDraft, FormErrors> {
    TodoForm::bind(data.clone()).into_result().inspect_err(|errors| {
        let fields: Vec<_> = errors.iter().map(|(field, _)| field).collect();
        warn!(
            "event=todo_{action} module=service status=rejected fields={}",
            fields.join(",")
        );
    })
}
