use rusqlite::Connection;
use todo_core::db::migrations::{current_user_version, latest_version};
use todo_core::db::{open_db, open_db_in_memory, DbError};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().expect("open in-memory db");

    assert_eq!(
        current_user_version(&conn).expect("read user_version"),
        latest_version()
    );
    assert_table_exists(&conn, "todos");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("todo.sqlite3");

    let conn_first = open_db(&path).expect("first open");
    conn_first
        .execute(
            "INSERT INTO todos (title, resolved, created_at, updated_at) VALUES ('kept', 0, 1, 1);",
            [],
        )
        .expect("insert row before reopen");
    drop(conn_first);

    let conn_second = open_db(&path).expect("second open");
    assert_eq!(
        current_user_version(&conn_second).expect("read user_version"),
        latest_version()
    );
    let count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM todos;", [], |row| row.get(0))
        .expect("count todos");
    assert_eq!(count, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).expect("open raw connection");
    conn.execute_batch("PRAGMA user_version = 999;")
        .expect("set future user_version");
    drop(conn);

    let err = open_db(&path).expect_err("newer schema must be rejected");
    assert!(
        err.to_string().contains("todos schema is at version 999"),
        "{err}"
    );
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn schema_rejects_updated_at_before_created_at() {
    let conn = open_db_in_memory().expect("open in-memory db");

    let result = conn.execute(
        "INSERT INTO todos (title, resolved, created_at, updated_at) VALUES ('bad', 0, 10, 5);",
        [],
    );
    assert!(result.is_err());
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .expect("query sqlite_master");
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
