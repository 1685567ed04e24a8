//! `todo` command-line entry point.
//!
//! # Responsibility
//! - Load configuration, start logging and open the store.
//! - Dispatch one subcommand through `TodoService`.

mod cli;
mod config;

use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use std::fs;
use std::process::ExitCode;
use todo_core::db::open_db;
use todo_core::{init_logging, SqliteTodoRepository, TodoService, TodoServiceError};

use cli::{Cli, CliError};
use config::Config;

fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let args = Cli::parse();
    let config = Config::load(args.config.as_deref())?;

    match config.log_dir() {
        Ok(log_dir) => {
            if let Err(err) = init_logging(&config.log_level, &log_dir) {
                eprintln!("warning: logging disabled: {err}");
            }
        }
        Err(err) => eprintln!("warning: logging disabled: {err}"),
    }

    let db_path = config.database_path()?;
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent)
            .wrap_err_with(|| format!("failed to create {}", parent.display()))?;
    }
    let conn = open_db(&db_path)
        .wrap_err_with(|| format!("failed to open database {}", db_path.display()))?;
    let service = TodoService::new(SqliteTodoRepository::try_new(&conn)?);
    info!("event=cli_start module=cli status=ok db_path={}", db_path.display());

    let mut stdout = std::io::stdout().lock();
    match cli::run(args.command, &service, &mut stdout) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(CliError::Service(TodoServiceError::Validation(errors))) => {
            for (field, messages) in errors.iter() {
                for message in messages {
                    eprintln!("{field}: {message}");
                }
            }
            Ok(ExitCode::from(2))
        }
        Err(CliError::Service(TodoServiceError::TodoNotFound(id))) => {
            eprintln!("todo not found: {id}");
            Ok(ExitCode::from(1))
        }
        Err(err) => Err(err.into()),
    }
}
