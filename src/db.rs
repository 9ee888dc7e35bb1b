//! SQLite record store: connection bootstrap, schema, and row mapping.
//!
//! One connection is opened at application bootstrap, wrapped in a mutex,
//! and handed to each store. Rows are mapped into the typed records from
//! `models` right at this boundary; a malformed column (bad JSON, an
//! unknown task status) fails the query loudly instead of leaking an
//! untyped value into the rest of the application.

use crate::error::AppError;
use crate::models::{Citation, NoteRow, Project, Task, TaskStatus};
use rusqlite::types::Type;
use rusqlite::{Connection, Row};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS projects (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    directory_path TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS notes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    file_path TEXT NOT NULL,
    tags TEXT, /* JSON array */
    project_id INTEGER,
    created_at TEXT NOT NULL,
    FOREIGN KEY (project_id) REFERENCES projects (id)
);

CREATE TABLE IF NOT EXISTS citations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    url TEXT NOT NULL,
    file_path TEXT NOT NULL,
    annotations TEXT, /* JSON array */
    project_id INTEGER,
    created_at TEXT NOT NULL,
    FOREIGN KEY (project_id) REFERENCES projects (id)
);

CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    due_date TEXT,
    status TEXT NOT NULL DEFAULT 'pending',
    project_id INTEGER,
    created_at TEXT NOT NULL,
    FOREIGN KEY (project_id) REFERENCES projects (id)
);
"#;

// ============================================================================
// Database Handle
// ============================================================================

/// Shared handle to the SQLite connection. Cheap to clone; every store
/// holds one. Queries are short and serialized behind the mutex.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database file and initialize the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Database, AppError> {
        let conn = Connection::open(path)?;
        Self::bootstrap(conn)
    }

    /// In-memory database, used by tests.
    pub fn open_in_memory() -> Result<Database, AppError> {
        let conn = Connection::open_in_memory()?;
        Self::bootstrap(conn)
    }

    fn bootstrap(conn: Connection) -> Result<Database, AppError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(SCHEMA)?;
        Ok(Database {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Lock the connection for a batch of statements. Callers must not hold
    /// the guard across an await point.
    pub fn lock(&self) -> Result<MutexGuard<'_, Connection>, AppError> {
        self.conn
            .lock()
            .map_err(|_| AppError::Storage("database mutex poisoned".to_string()))
    }
}

// ============================================================================
// Row Mapping
// ============================================================================

pub(crate) fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get("id")?,
        name: row.get("name")?,
        directory_path: row.get("directory_path")?,
        created_at: row.get("created_at")?,
    })
}

pub(crate) fn note_from_row(row: &Row<'_>) -> rusqlite::Result<NoteRow> {
    Ok(NoteRow {
        id: row.get("id")?,
        title: row.get("title")?,
        file_path: row.get("file_path")?,
        tags: json_list(row, "tags")?,
        project_id: row.get("project_id")?,
        created_at: row.get("created_at")?,
    })
}

pub(crate) fn citation_from_row(row: &Row<'_>) -> rusqlite::Result<Citation> {
    Ok(Citation {
        id: row.get("id")?,
        title: row.get("title")?,
        url: row.get("url")?,
        file_path: row.get("file_path")?,
        annotations: json_list(row, "annotations")?,
        project_id: row.get("project_id")?,
        created_at: row.get("created_at")?,
    })
}

pub(crate) fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    let raw_status: String = row.get("status")?;
    let status = TaskStatus::parse(&raw_status).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            Type::Text,
            format!("unknown task status '{}'", raw_status).into(),
        )
    })?;

    Ok(Task {
        id: row.get("id")?,
        title: row.get("title")?,
        due_date: row.get("due_date")?,
        status,
        project_id: row.get("project_id")?,
        created_at: row.get("created_at")?,
    })
}

/// Deserialize a nullable JSON-array text column. NULL and blank map to an
/// empty list; malformed JSON fails the row.
fn json_list<T: DeserializeOwned>(row: &Row<'_>, column: &str) -> rusqlite::Result<Vec<T>> {
    let raw: Option<String> = row.get(column)?;
    match raw {
        None => Ok(Vec::new()),
        Some(text) if text.trim().is_empty() => Ok(Vec::new()),
        Some(text) => serde_json::from_str(&text)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rusqlite::params;

    fn seed_project(conn: &Connection) -> i64 {
        conn.execute(
            "INSERT INTO projects (name, directory_path, created_at) VALUES (?1, ?2, ?3)",
            params!["p", "data/projects/p", Utc::now()],
        )
        .unwrap();
        conn.last_insert_rowid()
    }

    #[test]
    fn test_schema_init_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.lock().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
    }

    #[test]
    fn test_task_row_with_unknown_status_fails_loudly() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.lock().unwrap();
        let project_id = seed_project(&conn);
        conn.execute(
            "INSERT INTO tasks (title, status, project_id, created_at) VALUES (?1, ?2, ?3, ?4)",
            params!["t", "archived", project_id, Utc::now()],
        )
        .unwrap();

        let result = conn.query_row("SELECT * FROM tasks", [], |row| task_from_row(row));
        assert!(result.is_err());
    }

    #[test]
    fn test_json_list_handles_null_and_garbage() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.lock().unwrap();
        let project_id = seed_project(&conn);
        conn.execute(
            "INSERT INTO notes (title, file_path, tags, project_id, created_at)
             VALUES (?1, ?2, NULL, ?3, ?4)",
            params!["n", "x.md", project_id, Utc::now()],
        )
        .unwrap();

        let note = conn
            .query_row("SELECT * FROM notes", [], |row| note_from_row(row))
            .unwrap();
        assert!(note.tags.is_empty());

        conn.execute("UPDATE notes SET tags = 'not json'", []).unwrap();
        let result = conn.query_row("SELECT * FROM notes", [], |row| note_from_row(row));
        assert!(result.is_err());
    }
}
