//! Note store: database rows pointing at Markdown files on disk.
//!
//! The row is the pointer, the file is the content. A title or project
//! change moves the backing file to a freshly allocated path in the target
//! project's `notes/` directory; the old file is deleted best-effort. A
//! missing file never fails a listing, it just reads as empty.

use crate::db::{note_from_row, Database};
use crate::error::AppError;
use crate::models::{Note, NoteRow};
use crate::paths::{allocate_file_dated, sanitize};
use crate::projects::ProjectStore;
use rusqlite::{params, OptionalExtension};
use std::path::Path;
use tokio::fs;
use tracing::warn;

#[cfg(test)]
#[path = "notes_test.rs"]
mod notes_test;

#[derive(Clone)]
pub struct NoteStore {
    db: Database,
    projects: ProjectStore,
}

impl NoteStore {
    pub fn new(db: Database, projects: ProjectStore) -> Self {
        Self { db, projects }
    }

    /// Write the content file and insert the row. The project is validated
    /// first so an unknown `project_id` produces no side effects at all.
    pub async fn create(
        &self,
        title: &str,
        content: &str,
        tags: &[String],
        project_id: i64,
    ) -> Result<Note, AppError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::Validation(
                "Title and project_id are required".to_string(),
            ));
        }

        let project = self.projects.get(project_id)?;
        let notes_dir = Path::new(&project.directory_path).join("notes");
        fs::create_dir_all(&notes_dir).await?;

        let path = allocate_file_dated(&notes_dir, &sanitize(title), "md");
        fs::write(&path, content).await?;

        let file_path = path.to_string_lossy().to_string();
        let created_at = chrono::Utc::now();
        let tags_json = serde_json::to_string(tags)?;

        let conn = self.db.lock()?;
        conn.execute(
            "INSERT INTO notes (title, file_path, tags, project_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![title, file_path, tags_json, project_id, created_at],
        )?;
        let id = conn.last_insert_rowid();

        Ok(Note {
            id,
            title: title.to_string(),
            content: content.to_string(),
            file_path,
            tags: tags.to_vec(),
            project_id,
            created_at,
        })
    }

    /// Full update. A changed title or project moves the file: the content
    /// is written to a newly allocated path in the target directory and the
    /// old file is removed best-effort (a failed removal is logged, not
    /// fatal). Otherwise the existing file is overwritten in place.
    pub async fn update(
        &self,
        id: i64,
        title: &str,
        content: &str,
        tags: &[String],
        project_id: i64,
    ) -> Result<Note, AppError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::Validation(
                "Title and project_id are required".to_string(),
            ));
        }

        let existing = self.get_row(id)?;
        let moved = title != existing.title || project_id != existing.project_id;

        let file_path = if moved {
            let project = self.projects.get(project_id)?;
            let notes_dir = Path::new(&project.directory_path).join("notes");
            fs::create_dir_all(&notes_dir).await?;

            let new_path = allocate_file_dated(&notes_dir, &sanitize(title), "md");
            fs::write(&new_path, content).await?;

            if let Err(err) = fs::remove_file(&existing.file_path).await {
                warn!(
                    path = %existing.file_path,
                    error = %err,
                    "failed to remove old note file"
                );
            }
            new_path.to_string_lossy().to_string()
        } else {
            fs::write(&existing.file_path, content).await?;
            existing.file_path.clone()
        };

        let tags_json = serde_json::to_string(tags)?;
        {
            let conn = self.db.lock()?;
            conn.execute(
                "UPDATE notes SET title = ?1, file_path = ?2, tags = ?3, project_id = ?4
                 WHERE id = ?5",
                params![title, file_path, tags_json, project_id, id],
            )?;
        }

        Ok(Note {
            id,
            title: title.to_string(),
            content: content.to_string(),
            file_path,
            tags: tags.to_vec(),
            project_id,
            created_at: existing.created_at,
        })
    }

    /// Every row, newest first, with content read from disk. A read failure
    /// substitutes empty content and logs a warning; the listing itself
    /// never fails because one file is missing.
    pub async fn get_all(&self) -> Result<Vec<Note>, AppError> {
        let rows: Vec<NoteRow> = {
            let conn = self.db.lock()?;
            let mut stmt = conn.prepare("SELECT * FROM notes ORDER BY created_at DESC, id DESC")?;
            stmt.query_map([], |row| note_from_row(row))?
                .collect::<rusqlite::Result<Vec<_>>>()?
        };

        let mut notes = Vec::with_capacity(rows.len());
        for row in rows {
            let content = match fs::read_to_string(&row.file_path).await {
                Ok(content) => content,
                Err(err) => {
                    warn!(path = %row.file_path, error = %err, "cannot read note file");
                    String::new()
                }
            };
            notes.push(row.with_content(content));
        }
        Ok(notes)
    }

    fn get_row(&self, id: i64) -> Result<NoteRow, AppError> {
        let conn = self.db.lock()?;
        conn.query_row("SELECT * FROM notes WHERE id = ?1", [id], |row| {
            note_from_row(row)
        })
        .optional()?
        .ok_or_else(|| AppError::NotFound("Note not found".to_string()))
    }
}
