use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;

use todo_core::form::todo_form::{FIELD_DESCRIPTION, FIELD_DUE_DATE, FIELD_RESOLVED, FIELD_TITLE};
use todo_core::{
    FormData, Todo, TodoForm, TodoId, TodoListQuery, TodoRepository, TodoService,
    TodoServiceError,
};

#[derive(Parser)]
#[command(name = "todo")]
#[command(about = "A small to-do tracker")]
#[command(version)]
pub struct Cli {
    /// Config file path (defaults to the platform config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a todo
    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// Due date (YYYY-MM-DD or MM/DD/YYYY)
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        resolved: bool,
    },
    /// List todos, newest first
    List {
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Show one todo
    Show { id: TodoId },
    /// Edit fields of a todo; omitted fields keep their value
    Edit {
        id: TodoId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,
        #[arg(long)]
        clear_due: bool,
        #[arg(long)]
        resolved: Option<bool>,
    },
    /// Mark a todo resolved
    Resolve { id: TodoId },
    /// Mark a todo unresolved
    Reopen { id: TodoId },
    /// Delete a todo
    Delete { id: TodoId },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Service(#[from] TodoServiceError),
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Execute one command against the service, writing results to `out`.
pub fn run<R: TodoRepository>(
    command: Commands,
    service: &TodoService<R>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match command {
        Commands::Add {
            title,
            description,
            due,
            resolved,
        } => {
            let mut data = FormData::new();
            data.insert(FIELD_TITLE.to_string(), title);
            if let Some(description) = description {
                data.insert(FIELD_DESCRIPTION.to_string(), description);
            }
            if let Some(due) = due {
                data.insert(FIELD_DUE_DATE.to_string(), due);
            }
            if resolved {
                data.insert(FIELD_RESOLVED.to_string(), "on".to_string());
            }
            let todo = service.create_todo(&data)?;
            writeln!(out, "Todo created (ID: {})", todo.id)?;
        }
        Commands::List { limit, offset } => {
            let todos = service.list_todos(&TodoListQuery { limit, offset })?;
            if todos.is_empty() {
                writeln!(out, "No todos.")?;
            }
            for todo in &todos {
                writeln!(out, "{}", summary_line(todo))?;
            }
        }
        Commands::Show { id } => {
            let todo = service.get_todo(id)?;
            write_details(out, &todo)?;
        }
        Commands::Edit {
            id,
            title,
            description,
            due,
            clear_due,
            resolved,
        } => {
            let current = service.get_todo(id)?;
            let mut data = TodoForm::initial(&current);
            if let Some(title) = title {
                data.insert(FIELD_TITLE.to_string(), title);
            }
            if let Some(description) = description {
                data.insert(FIELD_DESCRIPTION.to_string(), description);
            }
            if clear_due {
                data.remove(FIELD_DUE_DATE);
            } else if let Some(due) = due {
                data.insert(FIELD_DUE_DATE.to_string(), due);
            }
            if let Some(resolved) = resolved {
                data.insert(FIELD_RESOLVED.to_string(), resolved.to_string());
            }
            let todo = service.update_todo(id, &data)?;
            writeln!(out, "Todo updated (ID: {})", todo.id)?;
        }
        Commands::Resolve { id } => {
            service.set_resolved(id, true)?;
            writeln!(out, "Todo resolved (ID: {id})")?;
        }
        Commands::Reopen { id } => {
            service.set_resolved(id, false)?;
            writeln!(out, "Todo reopened (ID: {id})")?;
        }
        Commands::Delete { id } => {
            service.delete_todo(id)?;
            writeln!(out, "Todo deleted (ID: {id})")?;
        }
    }

    Ok(())
}

fn summary_line(todo: &Todo) -> String {
    let mark = if todo.resolved { "x" } else { " " };
    let mut line = format!("{:>4} [{mark}] {}", todo.id, todo.title);
    if let Some(due) = todo.due_date {
        line.push_str(&format!("  (due {due})"));
    }
    if todo.is_overdue() {
        line.push_str("  OVERDUE");
    }
    line
}

fn write_details(out: &mut impl Write, todo: &Todo) -> std::io::Result<()> {
    writeln!(out, "ID:          {}", todo.id)?;
    writeln!(out, "Title:       {}", todo.title)?;
    writeln!(
        out,
        "Description: {}",
        todo.description.as_deref().unwrap_or("-")
    )?;
    match todo.due_date {
        Some(due) => writeln!(out, "Due:         {due}")?,
        None => writeln!(out, "Due:         -")?,
    }
    writeln!(out, "Resolved:    {}", if todo.resolved { "yes" } else { "no" })?;
    writeln!(out, "Overdue:     {}", if todo.is_overdue() { "yes" } else { "no" })?;
    writeln!(out, "Created:     {}", todo.created_at.format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out, "Updated:     {}", todo.updated_at.format("%Y-%m-%d %H:%M:%S"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{run, CliError, Commands};
    use todo_core::db::open_db_in_memory;
    use todo_core::{SqliteTodoRepository, TodoService, TodoServiceError};

    fn output<R: todo_core::TodoRepository>(
        command: Commands,
        service: &TodoService<R>,
    ) -> Result<String, CliError> {
        let mut out = Vec::new();
        run(command, service, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn add_then_list_flags_overdue() {
        let conn = open_db_in_memory().unwrap();
        let service = TodoService::new(SqliteTodoRepository::try_new(&conn).unwrap());

        let added = output(
            Commands::Add {
                title: "Return library books".to_string(),
                description: None,
                due: Some("2001-01-01".to_string()),
                resolved: false,
            },
            &service,
        )
        .unwrap();
        assert_eq!(added, "Todo created (ID: 1)\n");

        let listed = output(
            Commands::List {
                limit: None,
                offset: 0,
            },
            &service,
        )
        .unwrap();
        assert!(listed.contains("Return library books"));
        assert!(listed.contains("(due 2001-01-01)"));
        assert!(listed.trim_end().ends_with("OVERDUE"));
    }

    #[test]
    fn show_and_list_agree_on_overdue() {
        let conn = open_db_in_memory().unwrap();
        let service = TodoService::new(SqliteTodoRepository::try_new(&conn).unwrap());

        for (title, due) in [("Renew passport", "2001-01-01"), ("Water plants", "2999-01-01")] {
            output(
                Commands::Add {
                    title: title.to_string(),
                    description: None,
                    due: Some(due.to_string()),
                    resolved: false,
                },
                &service,
            )
            .unwrap();
        }

        let listed = output(
            Commands::List {
                limit: None,
                offset: 0,
            },
            &service,
        )
        .unwrap();
        for line in listed.lines() {
            let overdue_in_list = line.ends_with("OVERDUE");
            let id = if line.contains("Renew passport") { 1 } else { 2 };
            let shown = output(Commands::Show { id }, &service).unwrap();
            let overdue_in_show = shown.contains("Overdue:     yes");
            assert_eq!(overdue_in_list, overdue_in_show, "{line}");
            assert_eq!(overdue_in_show, id == 1);
        }
    }

    #[test]
    fn edit_keeps_unspecified_fields() {
        let conn = open_db_in_memory().unwrap();
        let service = TodoService::new(SqliteTodoRepository::try_new(&conn).unwrap());

        output(
            Commands::Add {
                title: "Plan trip".to_string(),
                description: Some("book hotel".to_string()),
                due: Some("2099-05-01".to_string()),
                resolved: false,
            },
            &service,
        )
        .unwrap();

        output(
            Commands::Edit {
                id: 1,
                title: None,
                description: None,
                due: None,
                clear_due: true,
                resolved: Some(true),
            },
            &service,
        )
        .unwrap();

        let todo = service.get_todo(1).unwrap();
        assert_eq!(todo.title, "Plan trip");
        assert_eq!(todo.description.as_deref(), Some("book hotel"));
        assert_eq!(todo.due_date, None);
        assert!(todo.resolved);
    }

    #[test]
    fn invalid_due_date_surfaces_validation_error() {
        let conn = open_db_in_memory().unwrap();
        let service = TodoService::new(SqliteTodoRepository::try_new(&conn).unwrap());

        let err = output(
            Commands::Add {
                title: "Call plumber".to_string(),
                description: None,
                due: Some("tomorrow".to_string()),
                resolved: false,
            },
            &service,
        )
        .unwrap_err();

        match err {
            CliError::Service(TodoServiceError::Validation(errors)) => {
                assert_eq!(errors.get("due_date"), ["Enter a valid date."]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn delete_unknown_id_reports_not_found() {
        let conn = open_db_in_memory().unwrap();
        let service = TodoService::new(SqliteTodoRepository::try_new(&conn).unwrap());

        let err = output(Commands::Delete { id: 3 }, &service).unwrap_err();
        assert!(matches!(
            err,
            CliError::Service(TodoServiceError::TodoNotFound(3))
        ));
    }
}
