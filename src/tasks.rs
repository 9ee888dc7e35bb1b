//! Task store: plain database CRUD, no filesystem component.

use crate::db::{task_from_row, Database};
use crate::error::AppError;
use crate::models::{Task, TaskStatus, UpdateTaskRequest};
use crate::projects::ProjectStore;
use chrono::{NaiveDate, Utc};
use rusqlite::{params, OptionalExtension};

#[cfg(test)]
#[path = "tasks_test.rs"]
mod tasks_test;

#[derive(Clone)]
pub struct TaskStore {
    db: Database,
    projects: ProjectStore,
}

impl TaskStore {
    pub fn new(db: Database, projects: ProjectStore) -> Self {
        Self { db, projects }
    }

    pub fn create(
        &self,
        title: &str,
        due_date: Option<&str>,
        status: Option<&str>,
        project_id: i64,
    ) -> Result<Task, AppError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::Validation(
                "Title and project_id are required".to_string(),
            ));
        }

        let status = match status {
            Some(raw) => parse_status(raw)?,
            None => TaskStatus::Pending,
        };
        let due_date = parse_due_date(due_date)?;

        if !self.projects.exists(project_id)? {
            return Err(AppError::NotFound("Project not found".to_string()));
        }

        let created_at = Utc::now();
        let conn = self.db.lock()?;
        conn.execute(
            "INSERT INTO tasks (title, due_date, status, project_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![title, due_date, status.as_str(), project_id, created_at],
        )?;
        let id = conn.last_insert_rowid();

        Ok(Task {
            id,
            title: title.to_string(),
            due_date,
            status,
            project_id,
            created_at,
        })
    }

    /// All tasks, soonest due date first, then newest.
    pub fn get_all(&self) -> Result<Vec<Task>, AppError> {
        let conn = self.db.lock()?;
        let mut stmt =
            conn.prepare("SELECT * FROM tasks ORDER BY due_date ASC, created_at DESC")?;
        let tasks = stmt
            .query_map([], |row| task_from_row(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tasks)
    }

    pub fn get(&self, id: i64) -> Result<Task, AppError> {
        let conn = self.db.lock()?;
        conn.query_row("SELECT * FROM tasks WHERE id = ?1", [id], |row| {
            task_from_row(row)
        })
        .optional()?
        .ok_or_else(|| AppError::NotFound("Task not found".to_string()))
    }

    /// Replace the status; anything outside the enum is rejected and the
    /// stored status is left unchanged.
    pub fn set_status(&self, id: i64, status: &str) -> Result<Task, AppError> {
        let status = parse_status(status)?;

        let conn = self.db.lock()?;
        let changed = conn.execute(
            "UPDATE tasks SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id],
        )?;
        if changed == 0 {
            return Err(AppError::NotFound("Task not found".to_string()));
        }

        conn.query_row("SELECT * FROM tasks WHERE id = ?1", [id], |row| {
            task_from_row(row)
        })
        .map_err(AppError::from)
    }

    /// Partial update: only supplied fields are modified.
    pub fn update(&self, id: i64, update: &UpdateTaskRequest) -> Result<Task, AppError> {
        let existing = self.get(id)?;

        let title = match update.title.as_deref() {
            Some(raw) if raw.trim().is_empty() => {
                return Err(AppError::Validation("Title cannot be empty".to_string()))
            }
            Some(raw) => raw.trim().to_string(),
            None => existing.title,
        };
        let status = match update.status.as_deref() {
            Some(raw) => parse_status(raw)?,
            None => existing.status,
        };
        let due_date = match update.due_date.as_deref() {
            Some(raw) => parse_due_date(Some(raw))?,
            None => existing.due_date,
        };
        let project_id = match update.project_id {
            Some(new_project) => {
                if !self.projects.exists(new_project)? {
                    return Err(AppError::NotFound("Project not found".to_string()));
                }
                new_project
            }
            None => existing.project_id,
        };

        let conn = self.db.lock()?;
        conn.execute(
            "UPDATE tasks SET title = ?1, due_date = ?2, status = ?3, project_id = ?4
             WHERE id = ?5",
            params![title, due_date, status.as_str(), project_id, id],
        )?;

        Ok(Task {
            id,
            title,
            due_date,
            status,
            project_id,
            created_at: existing.created_at,
        })
    }

    pub fn delete(&self, id: i64) -> Result<(), AppError> {
        let conn = self.db.lock()?;
        let changed = conn.execute("DELETE FROM tasks WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(AppError::NotFound("Task not found".to_string()));
        }
        Ok(())
    }
}

fn parse_status(raw: &str) -> Result<TaskStatus, AppError> {
    TaskStatus::parse(raw).ok_or_else(|| {
        AppError::Validation(
            "Valid status is required (pending, in-progress, or completed)".to_string(),
        )
    })
}

/// An absent or empty due date clears the field; otherwise it must be an
/// ISO `YYYY-MM-DD` date.
fn parse_due_date(raw: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    match raw {
        None => Ok(None),
        Some(text) if text.trim().is_empty() => Ok(None),
        Some(text) => NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                AppError::Validation("due_date must be an ISO date (YYYY-MM-DD)".to_string())
            }),
    }
}
