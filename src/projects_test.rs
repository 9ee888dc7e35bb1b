//! Tests for the project store: directory allocation, row lifecycle, and
//! the legacy directory migration.

use super::*;
use crate::AppState;
use tempfile::TempDir;

fn test_state() -> (TempDir, AppState) {
    let tmp = TempDir::new().unwrap();
    let state = AppState::with_data_dir(tmp.path().join("data")).unwrap();
    (tmp, state)
}

#[tokio::test]
async fn test_create_project_creates_directory_tree() {
    let (_tmp, state) = test_state();

    let project = state.projects.create("My Thesis").await.unwrap();
    assert_eq!(project.name, "My Thesis");

    let dir = Path::new(&project.directory_path);
    assert!(dir.ends_with("my_thesis"));
    assert!(dir.join("notes").is_dir());
    assert!(dir.join("citations").is_dir());

    let fetched = state.projects.get(project.id).unwrap();
    assert_eq!(fetched.directory_path, project.directory_path);
    assert_eq!(fetched.created_at, project.created_at);
}

#[tokio::test]
async fn test_duplicate_names_get_distinct_directories() {
    let (_tmp, state) = test_state();

    let first = state.projects.create("My Thesis").await.unwrap();
    let second = state.projects.create("My Thesis").await.unwrap();

    assert_ne!(first.directory_path, second.directory_path);
    assert!(Path::new(&second.directory_path).ends_with("my_thesis_1"));
    assert!(Path::new(&second.directory_path).join("notes").is_dir());
    assert!(Path::new(&second.directory_path).join("citations").is_dir());
}

#[tokio::test]
async fn test_empty_name_is_rejected() {
    let (_tmp, state) = test_state();

    let result = state.projects.create("   ").await;
    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(state.projects.get_all().unwrap().is_empty());
}

#[tokio::test]
async fn test_get_missing_project_is_not_found() {
    let (_tmp, state) = test_state();
    assert!(matches!(
        state.projects.get(42),
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_delete_removes_row_but_not_directory() {
    let (_tmp, state) = test_state();

    let project = state.projects.create("Throwaway").await.unwrap();
    state.projects.delete(project.id).unwrap();

    assert!(matches!(
        state.projects.get(project.id),
        Err(AppError::NotFound(_))
    ));
    // The directory tree is deliberately left behind.
    assert!(Path::new(&project.directory_path).is_dir());

    assert!(matches!(
        state.projects.delete(project.id),
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_migrate_moves_legacy_id_directory() {
    let (_tmp, state) = test_state();
    let projects_dir = state.projects.projects_dir().to_path_buf();

    // Simulate a legacy project keyed by id on disk.
    let (project_id, old_dir) = {
        let conn = state.db.lock().unwrap();
        conn.execute(
            "INSERT INTO projects (name, directory_path, created_at) VALUES (?1, ?2, ?3)",
            rusqlite::params!["Legacy Project", "placeholder", Utc::now()],
        )
        .unwrap();
        let id = conn.last_insert_rowid();
        let old_dir = projects_dir.join(id.to_string());
        conn.execute(
            "UPDATE projects SET directory_path = ?1 WHERE id = ?2",
            rusqlite::params![old_dir.to_string_lossy(), id],
        )
        .unwrap();
        (id, old_dir)
    };

    std::fs::create_dir_all(old_dir.join("notes")).unwrap();
    std::fs::write(old_dir.join("notes").join("reading.md"), "old content").unwrap();
    {
        let conn = state.db.lock().unwrap();
        conn.execute(
            "INSERT INTO notes (title, file_path, tags, project_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                "Reading",
                old_dir.join("notes").join("reading.md").to_string_lossy(),
                "[]",
                project_id,
                Utc::now()
            ],
        )
        .unwrap();
    }

    state.projects.migrate_directories().await.unwrap();

    let migrated = state.projects.get(project_id).unwrap();
    let new_dir = Path::new(&migrated.directory_path);
    assert!(new_dir.ends_with("legacy_project"));
    assert!(new_dir.join("notes").join("reading.md").is_file());
    assert_eq!(
        std::fs::read_to_string(new_dir.join("notes").join("reading.md")).unwrap(),
        "old content"
    );

    // The note row now points into the new tree.
    let note_path: String = {
        let conn = state.db.lock().unwrap();
        conn.query_row(
            "SELECT file_path FROM notes WHERE project_id = ?1",
            [project_id],
            |row| row.get(0),
        )
        .unwrap()
    };
    assert_eq!(
        note_path,
        new_dir.join("notes").join("reading.md").to_string_lossy()
    );
}
