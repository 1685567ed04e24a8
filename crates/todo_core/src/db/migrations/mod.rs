//! Ordered `todos` schema steps and the runner that applies them.
//!
//! Steps are applied inside one transaction, so a failing step leaves the
//! file at its previous version.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const TODO_SCHEMA_STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    name: "create_todos",
    sql: include_str!("0001_init.sql"),
}];

/// Newest `todos` schema version this build can produce.
pub fn latest_version() -> u32 {
    TODO_SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

fn steps_after(version: u32) -> impl Iterator<Item = &'static SchemaStep> {
    TODO_SCHEMA_STEPS
        .iter()
        .skip_while(move |step| step.version <= version)
}

/// Brings the `todos` schema on `conn` up to [`latest_version`].
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file is ahead of this build.
/// - `Sqlite` when a step fails; the transaction is rolled back.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = current_user_version(conn)?;
    let latest = latest_version();
    if from > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: latest,
        });
    }
    if from == latest {
        debug!("event=db_migrate module=db status=skip version={from}");
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in steps_after(from) {
        debug!(
            "event=db_migrate_step module=db status=start version={} name={}",
            step.version, step.name
        );
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={from} to_version={latest}");
    Ok(())
}

/// Schema version recorded in `PRAGMA user_version`; 0 for a fresh file.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}
