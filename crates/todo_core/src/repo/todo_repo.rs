//! Todo repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/read/update/delete APIs over the `todos` table.
//! - Own timestamp bookkeeping (`created_at`, `updated_at`).
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `TodoDraft::validate()` before SQL mutations.
//! - `updated_at` is refreshed on every successful write and never falls
//!   below `created_at`.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::todo::{Todo, TodoDraft, TodoId, TodoValidationError};
use chrono::{DateTime, NaiveDate, Utc};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const TODO_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    due_date,
    resolved,
    created_at,
    updated_at
FROM todos";

const TODO_COLUMNS: [&str; 7] = [
    "id",
    "title",
    "description",
    "due_date",
    "resolved",
    "created_at",
    "updated_at",
];

const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for todo persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Draft failed field validation at the store boundary.
    Validation(TodoValidationError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target record does not exist.
    NotFound(TodoId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted row cannot be converted into a valid record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "todo not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "todo repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "todo repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "todo repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted todo data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TodoValidationError> for RepoError {
    fn from(value: TodoValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Pagination options for listing todos.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoListQuery {
    /// Maximum rows to return. `None` means no limit.
    pub limit: Option<u32>,
    /// Number of rows to skip.
    pub offset: u32,
}

/// Repository interface for todo CRUD operations.
pub trait TodoRepository {
    /// Persists a new record and returns it with id and timestamps set.
    fn create_todo(&self, draft: &TodoDraft) -> RepoResult<Todo>;
    /// Gets one record by id.
    fn get_todo(&self, id: TodoId) -> RepoResult<Option<Todo>>;
    /// Replaces all editable fields of an existing record.
    fn update_todo(&self, id: TodoId, draft: &TodoDraft) -> RepoResult<Todo>;
    /// Removes one record.
    fn delete_todo(&self, id: TodoId) -> RepoResult<()>;
    /// Lists records newest first.
    fn list_todos(&self, query: &TodoListQuery) -> RepoResult<Vec<Todo>>;
}

/// SQLite-backed todo repository.
pub struct SqliteTodoRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTodoRepository<'conn> {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema
    ///   does not match what this repository reads and writes.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_todo_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl TodoRepository for SqliteTodoRepository<'_> {
    fn create_todo(&self, draft: &TodoDraft) -> RepoResult<Todo> {
        draft.validate()?;

        let now = now_millis();
        self.conn.execute(
            "INSERT INTO todos (
                title,
                description,
                due_date,
                resolved,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?5);",
            params![
                draft.title.as_str(),
                draft.description.as_deref(),
                draft.due_date.map(format_due_date),
                bool_to_int(draft.resolved),
                now,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!("event=todo_insert module=repo status=ok id={id}");

        let stamp = millis_to_datetime(now)?;
        Ok(Todo {
            id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            due_date: draft.due_date,
            resolved: draft.resolved,
            created_at: stamp,
            updated_at: stamp,
        })
    }

    fn get_todo(&self, id: TodoId) -> RepoResult<Option<Todo>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TODO_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_todo_row(row)?));
        }

        Ok(None)
    }

    fn update_todo(&self, id: TodoId, draft: &TodoDraft) -> RepoResult<Todo> {
        draft.validate()?;

        let changed = self.conn.execute(
            "UPDATE todos
             SET
                title = ?1,
                description = ?2,
                due_date = ?3,
                resolved = ?4,
                updated_at = MAX(created_at, ?5)
             WHERE id = ?6;",
            params![
                draft.title.as_str(),
                draft.description.as_deref(),
                draft.due_date.map(format_due_date),
                bool_to_int(draft.resolved),
                now_millis(),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        debug!("event=todo_update module=repo status=ok id={id}");

        self.get_todo(id)?.ok_or(RepoError::NotFound(id))
    }

    fn delete_todo(&self, id: TodoId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM todos WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        debug!("event=todo_delete module=repo status=ok id={id}");

        Ok(())
    }

    fn list_todos(&self, query: &TodoListQuery) -> RepoResult<Vec<Todo>> {
        let mut sql = format!("{TODO_SELECT_SQL} ORDER BY created_at DESC, id DESC");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut todos = Vec::new();

        while let Some(row) = rows.next()? {
            todos.push(parse_todo_row(row)?);
        }

        Ok(todos)
    }
}

fn parse_todo_row(row: &Row<'_>) -> RepoResult<Todo> {
    let due_date = match row.get::<_, Option<String>>("due_date")? {
        Some(value) => Some(parse_due_date(&value).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid due date `{value}` in todos.due_date"))
        })?),
        None => None,
    };

    let resolved = match row.get::<_, i64>("resolved")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid resolved value `{other}` in todos.resolved"
            )));
        }
    };

    let created_at = millis_to_datetime(row.get("created_at")?)?;
    let updated_at = millis_to_datetime(row.get("updated_at")?)?;
    if updated_at < created_at {
        return Err(RepoError::InvalidData(format!(
            "updated_at {updated_at} precedes created_at {created_at}"
        )));
    }

    let todo = Todo {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        due_date,
        resolved,
        created_at,
        updated_at,
    };
    todo.validate()?;
    Ok(todo)
}

fn ensure_todo_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "todos")? {
        return Err(RepoError::MissingRequiredTable("todos"));
    }

    for column in TODO_COLUMNS {
        if !table_has_column(conn, "todos", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "todos",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn millis_to_datetime(value: i64) -> RepoResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(value)
        .ok_or_else(|| RepoError::InvalidData(format!("timestamp `{value}` is out of range")))
}

fn format_due_date(value: NaiveDate) -> String {
    value.format(DUE_DATE_FORMAT).to_string()
}

fn parse_due_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DUE_DATE_FORMAT).ok()
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
