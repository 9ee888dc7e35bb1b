//! Project store: owns the project row and its directory tree.
//!
//! Creating a project allocates a collision-free directory under
//! `data/projects/`, creates the `notes/` and `citations/` subdirectories,
//! and inserts the row pointing at that directory. There is no transaction
//! spanning the two: if the insert fails after the directories were
//! created, the orphaned tree stays on disk and the failure is logged.

use crate::db::{project_from_row, Database};
use crate::error::AppError;
use crate::models::Project;
use crate::paths::{allocate_dir, sanitize};
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

#[cfg(test)]
#[path = "projects_test.rs"]
mod projects_test;

#[derive(Clone)]
pub struct ProjectStore {
    db: Database,
    projects_dir: PathBuf,
}

impl ProjectStore {
    pub fn new(db: Database, projects_dir: PathBuf) -> Self {
        Self { db, projects_dir }
    }

    pub fn projects_dir(&self) -> &Path {
        &self.projects_dir
    }

    /// Create the project directory tree and its row.
    pub async fn create(&self, name: &str) -> Result<Project, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Project name is required".to_string()));
        }

        let slug = sanitize(name);
        let project_dir = allocate_dir(&self.projects_dir, &slug);

        fs::create_dir_all(project_dir.join("notes")).await?;
        fs::create_dir_all(project_dir.join("citations")).await?;
        info!(dir = %project_dir.display(), "created project directories");

        let directory_path = project_dir.to_string_lossy().to_string();
        let created_at = Utc::now();

        let conn = self.db.lock()?;
        conn.execute(
            "INSERT INTO projects (name, directory_path, created_at) VALUES (?1, ?2, ?3)",
            params![name, directory_path, created_at],
        )?;
        let id = conn.last_insert_rowid();

        Ok(Project {
            id,
            name: name.to_string(),
            directory_path,
            created_at,
        })
    }

    pub fn get_all(&self) -> Result<Vec<Project>, AppError> {
        let conn = self.db.lock()?;
        let mut stmt =
            conn.prepare("SELECT * FROM projects ORDER BY created_at DESC, id DESC")?;
        let projects = stmt
            .query_map([], |row| project_from_row(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(projects)
    }

    pub fn get(&self, id: i64) -> Result<Project, AppError> {
        let conn = self.db.lock()?;
        conn.query_row("SELECT * FROM projects WHERE id = ?1", [id], |row| {
            project_from_row(row)
        })
        .optional()?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))
    }

    pub fn exists(&self, id: i64) -> Result<bool, AppError> {
        let conn = self.db.lock()?;
        let found: Option<i64> = conn
            .query_row("SELECT id FROM projects WHERE id = ?1", [id], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(found.is_some())
    }

    /// Delete the row only. The directory tree and any member rows are left
    /// behind; cleanup is the caller's concern.
    pub fn delete(&self, id: i64) -> Result<(), AppError> {
        let conn = self.db.lock()?;
        let changed = conn.execute("DELETE FROM projects WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(AppError::NotFound("Project not found".to_string()));
        }
        Ok(())
    }

    // ========================================================================
    // Directory Migration
    // ========================================================================

    /// Move legacy id-keyed project directories (`data/projects/<id>/`) to
    /// sanitized-name directories, rewriting stored note paths and the
    /// project's `directory_path`. Run explicitly via the `migrate`
    /// subcommand; never invoked at startup.
    pub async fn migrate_directories(&self) -> Result<(), AppError> {
        let projects = self.get_all()?;
        info!(count = projects.len(), "starting project directory migration");

        for project in projects {
            let old_dir = self.projects_dir.join(project.id.to_string());
            let current_dir = PathBuf::from(&project.directory_path);

            if old_dir.is_dir() {
                let new_dir = allocate_dir(&self.projects_dir, &sanitize(&project.name));
                info!(
                    project = project.id,
                    from = %old_dir.display(),
                    to = %new_dir.display(),
                    "migrating project directory"
                );

                copy_tree_shallow(&old_dir, &new_dir).await?;
                fs::create_dir_all(new_dir.join("notes")).await?;
                fs::create_dir_all(new_dir.join("citations")).await?;

                self.rewrite_note_paths(project.id, &new_dir)?;
                self.set_directory_path(project.id, &new_dir)?;
            } else if !current_dir.is_dir() {
                // No legacy tree and the recorded directory is gone:
                // rebuild a fresh structure under the sanitized name.
                let new_dir = allocate_dir(&self.projects_dir, &sanitize(&project.name));
                warn!(
                    project = project.id,
                    dir = %new_dir.display(),
                    "recorded directory missing, creating fresh structure"
                );
                fs::create_dir_all(new_dir.join("notes")).await?;
                fs::create_dir_all(new_dir.join("citations")).await?;
                self.set_directory_path(project.id, &new_dir)?;
            }
        }

        info!("project directory migration completed");
        Ok(())
    }

    fn rewrite_note_paths(&self, project_id: i64, new_dir: &Path) -> Result<(), AppError> {
        let conn = self.db.lock()?;
        let mut stmt = conn.prepare("SELECT id, file_path FROM notes WHERE project_id = ?1")?;
        let rows = stmt
            .query_map([project_id], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for (note_id, old_path) in rows {
            let file_name = match Path::new(&old_path).file_name() {
                Some(name) => name.to_os_string(),
                None => continue,
            };
            let new_path = new_dir.join("notes").join(&file_name);
            conn.execute(
                "UPDATE notes SET file_path = ?1 WHERE id = ?2",
                params![new_path.to_string_lossy(), note_id],
            )?;
        }
        Ok(())
    }

    fn set_directory_path(&self, project_id: i64, dir: &Path) -> Result<(), AppError> {
        let conn = self.db.lock()?;
        conn.execute(
            "UPDATE projects SET directory_path = ?1 WHERE id = ?2",
            params![dir.to_string_lossy(), project_id],
        )?;
        Ok(())
    }
}

/// Copy `src` into `dst`: top-level files plus one level of subdirectories,
/// which is the full depth a project tree uses.
async fn copy_tree_shallow(src: &Path, dst: &Path) -> Result<(), AppError> {
    fs::create_dir_all(dst).await?;
    let mut entries = fs::read_dir(src).await?;
    while let Some(entry) = entries.next_entry().await? {
        let target = dst.join(entry.file_name());
        if entry.file_type().await?.is_dir() {
            fs::create_dir_all(&target).await?;
            let mut sub_entries = fs::read_dir(entry.path()).await?;
            while let Some(sub) = sub_entries.next_entry().await? {
                if sub.file_type().await?.is_file() {
                    fs::copy(sub.path(), target.join(sub.file_name())).await?;
                }
            }
        } else {
            fs::copy(entry.path(), &target).await?;
        }
    }
    Ok(())
}
