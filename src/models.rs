//! Data models for the research helper.
//!
//! This module contains the typed records persisted in the record store
//! (projects, notes, citations, tasks), the arXiv search result shape,
//! and the JSON request payloads accepted by the HTTP layer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Core Records
// ============================================================================

/// A project row. `directory_path` points at the project's root directory
/// on disk, which contains `notes/` and `citations/` once creation succeeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub directory_path: String,
    pub created_at: DateTime<Utc>,
}

/// A note row as stored in the database. The note body lives in the file at
/// `file_path`; the row is a pointer, not the content.
#[derive(Debug, Clone)]
pub struct NoteRow {
    pub id: i64,
    pub title: String,
    pub file_path: String,
    pub tags: Vec<String>,
    pub project_id: i64,
    pub created_at: DateTime<Utc>,
}

impl NoteRow {
    /// Assemble the API-facing note by inlining the file content.
    pub fn with_content(self, content: String) -> Note {
        Note {
            id: self.id,
            title: self.title,
            content,
            file_path: self.file_path,
            tags: self.tags,
            project_id: self.project_id,
            created_at: self.created_at,
        }
    }
}

/// A note with its file content inlined, as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub file_path: String,
    pub tags: Vec<String>,
    pub project_id: i64,
    pub created_at: DateTime<Utc>,
}

/// A citation: bibliographic metadata plus a pointer to the downloaded PDF.
/// `annotations` is an ordered list of free-form entries.
#[derive(Debug, Clone, Serialize)]
pub struct Citation {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub file_path: String,
    pub annotations: Vec<serde_json::Value>,
    pub project_id: i64,
    pub created_at: DateTime<Utc>,
}

/// A task row. Tasks have no filesystem component.
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub due_date: Option<NaiveDate>,
    pub status: TaskStatus,
    pub project_id: i64,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Task Status
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Parse a wire/database value. Returns `None` for anything outside the
    /// closed three-value set.
    pub fn parse(value: &str) -> Option<TaskStatus> {
        match value {
            "pending" => Some(TaskStatus::Pending),
            "in-progress" => Some(TaskStatus::InProgress),
            "completed" => Some(TaskStatus::Completed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// arXiv Search Results
// ============================================================================

/// One entry from an arXiv Atom feed, flattened for the frontend.
#[derive(Debug, Clone, Serialize)]
pub struct ArxivPaper {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub published: String,
    pub authors: Vec<String>,
    pub pdf_url: String,
    pub arxiv_url: String,
    pub categories: Vec<String>,
}

// ============================================================================
// Request Payloads
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProjectRequest {
    pub name: Option<String>,
}

/// Shared body for note creation (POST) and full update (PUT).
#[derive(Debug, Clone, Deserialize)]
pub struct NotePayload {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub project_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCitationRequest {
    pub title: Option<String>,
    pub url: Option<String>,
    pub project_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportArxivRequest {
    pub id: Option<String>,
    pub title: Option<String>,
    pub pdf_url: Option<String>,
    pub project_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub due_date: Option<String>,
    pub status: Option<String>,
    pub project_id: Option<i64>,
}

/// Partial update: only supplied fields are modified. A supplied empty
/// `due_date` clears the stored date.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub due_date: Option<String>,
    pub status: Option<String>,
    pub project_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTaskStatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArxivSearchQuery {
    pub query: Option<String>,
    pub start: Option<u32>,
    pub max_results: Option<u32>,
}
