//! Research helper - a personal research organizer backend.
//!
//! Projects own a directory tree on disk (`notes/`, `citations/`) and a row
//! in a SQLite database; notes and citations are rows pointing at files
//! inside that tree; tasks are rows only. A thin REST layer exposes the
//! stores, plus an arXiv search gateway for importing papers as citations.
//!
//! Modules:
//!
//! - `models`: typed records and request payloads
//! - `error`: error taxonomy and HTTP mapping
//! - `db`: SQLite bootstrap, schema, and row mapping
//! - `paths`: name sanitization and collision-free path allocation
//! - `projects` / `notes` / `citations` / `tasks`: the stores
//! - `arxiv`: arXiv search gateway
//! - `url_validator`: outbound URL checks for PDF downloads
//! - `handlers`: HTTP route handlers

use std::env;
use std::path::PathBuf;

pub mod arxiv;
pub mod citations;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod notes;
pub mod paths;
pub mod projects;
pub mod tasks;
pub mod url_validator;

use citations::CitationStore;
use db::Database;
use error::AppError;
use notes::NoteStore;
use projects::ProjectStore;
use tasks::TaskStore;

// ============================================================================
// Configuration
// ============================================================================

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_PORT: u16 = 3000;
pub const DB_FILE: &str = "research_helper.db";

/// Data directory, overridable via `RESEARCH_HELPER_DATA`.
pub fn data_dir() -> PathBuf {
    env::var("RESEARCH_HELPER_DATA")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR))
}

/// Listen port, overridable via `RESEARCH_HELPER_PORT`.
pub fn server_port() -> u16 {
    env::var("RESEARCH_HELPER_PORT")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

// ============================================================================
// Application State
// ============================================================================

/// All stores, constructed once at bootstrap around a single database
/// handle and the data directory. Nothing re-initializes mid-process.
pub struct AppState {
    pub data_dir: PathBuf,
    pub db: Database,
    pub projects: ProjectStore,
    pub notes: NoteStore,
    pub citations: CitationStore,
    pub tasks: TaskStore,
}

impl AppState {
    pub fn new() -> Result<AppState, AppError> {
        Self::with_data_dir(data_dir())
    }

    /// Create the data directory tree, open the database, and wire up the
    /// stores. Used directly by tests with a temporary directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Result<AppState, AppError> {
        let projects_dir = data_dir.join("projects");
        std::fs::create_dir_all(&projects_dir)?;

        let db = Database::open(data_dir.join(DB_FILE))?;

        let projects = ProjectStore::new(db.clone(), projects_dir);
        let notes = NoteStore::new(db.clone(), projects.clone());
        let citations = CitationStore::new(db.clone(), projects.clone());
        let tasks = TaskStore::new(db.clone(), projects.clone());

        Ok(AppState {
            data_dir,
            db,
            projects,
            notes,
            citations,
            tasks,
        })
    }
}

// Re-export commonly used types
pub use error::AppError as Error;
pub use models::{ArxivPaper, Citation, Note, NoteRow, Project, Task, TaskStatus};
pub use paths::{allocate_dir, allocate_file_dated, sanitize, sanitize_collapsed};
