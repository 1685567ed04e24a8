//! Todo domain model.
//!
//! # Responsibility
//! - Define the persisted `Todo` record and its editable `TodoDraft` shape.
//! - Own the overdue rule used by every caller.
//!
//! # Invariants
//! - `title` is non-empty after trimming and at most `TITLE_MAX_CHARS` chars.
//! - `created_at <= updated_at` for every persisted record.
//! - A record without `due_date` is never overdue.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned surrogate identifier.
pub type TodoId = i64;

/// Maximum title length in characters.
pub const TITLE_MAX_CHARS: usize = 200;

/// Validation error for draft/record field invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoValidationError {
    /// Title is empty or whitespace-only.
    EmptyTitle,
    /// Title exceeds `TITLE_MAX_CHARS`.
    TitleTooLong { len: usize, max: usize },
}

impl Display for TodoValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::TitleTooLong { len, max } => {
                write!(f, "title has {len} characters; at most {max} allowed")
            }
        }
    }
}

impl Error for TodoValidationError {}

/// Editable fields of a todo, ready to be persisted.
///
/// Produced by `TodoForm` from raw input, or built directly by callers that
/// already hold typed values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub resolved: bool,
}

impl TodoDraft {
    /// Creates an unresolved draft with no description and no due date.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            due_date: None,
            resolved: false,
        }
    }

    /// Sets the due date, builder style.
    pub fn due(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the description, builder style.
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the resolved flag, builder style.
    pub fn resolved(mut self, resolved: bool) -> Self {
        self.resolved = resolved;
        self
    }

    /// Validates field invariants enforced at the store boundary.
    ///
    /// # Errors
    /// - `EmptyTitle` when the title is blank.
    /// - `TitleTooLong` when the title exceeds `TITLE_MAX_CHARS`.
    pub fn validate(&self) -> Result<(), TodoValidationError> {
        validate_title(&self.title)
    }
}

/// Persisted todo record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub resolved: bool,
    /// Set once at creation; never rewritten.
    pub created_at: DateTime<Utc>,
    /// Refreshed on every successful write.
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Returns the editable fields of this record as a draft.
    ///
    /// Used for whole-record updates where one field changes.
    pub fn to_draft(&self) -> TodoDraft {
        TodoDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            due_date: self.due_date,
            resolved: self.resolved,
        }
    }

    /// Overdue relative to an explicit calendar date.
    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        is_overdue(self, today)
    }

    /// Overdue relative to the current UTC date.
    pub fn is_overdue(&self) -> bool {
        is_overdue(self, today_utc())
    }

    /// Checks persisted-state invariants.
    pub fn validate(&self) -> Result<(), TodoValidationError> {
        validate_title(&self.title)
    }
}

/// Returns whether `todo` is overdue on `today`.
///
/// True only for unresolved records with a due date strictly before `today`.
/// A record due on `today` itself is not overdue.
pub fn is_overdue(todo: &Todo, today: NaiveDate) -> bool {
    !todo.resolved && todo.due_date.is_some_and(|due| due < today)
}

/// Current calendar date in UTC.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

fn validate_title(title: &str) -> Result<(), TodoValidationError> {
    if title.trim().is_empty() {
        return Err(TodoValidationError::EmptyTitle);
    }
    let len = title.chars().count();
    if len > TITLE_MAX_CHARS {
        return Err(TodoValidationError::TitleTooLong {
            len,
            max: TITLE_MAX_CHARS,
        });
    }
    Ok(())
}
