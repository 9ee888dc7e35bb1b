//! Tests for the task store: defaults, the closed status enum, and
//! partial-update semantics.

use super::*;
use crate::models::UpdateTaskRequest;
use crate::AppState;
use tempfile::TempDir;

fn test_state() -> (TempDir, AppState) {
    let tmp = TempDir::new().unwrap();
    let state = AppState::with_data_dir(tmp.path().join("data")).unwrap();
    (tmp, state)
}

async fn project_id(state: &AppState) -> i64 {
    state.projects.create("Tasks Project").await.unwrap().id
}

#[tokio::test]
async fn test_create_task_defaults_to_pending() {
    let (_tmp, state) = test_state();
    let project = project_id(&state).await;

    let task = state
        .tasks
        .create("Write intro", Some("2026-09-01"), None, project)
        .unwrap();

    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(
        task.due_date,
        Some(NaiveDate::from_ymd_opt(2026, 9, 1).unwrap())
    );

    let fetched = state.tasks.get(task.id).unwrap();
    assert_eq!(fetched.status, TaskStatus::Pending);
    assert_eq!(fetched.due_date, task.due_date);
}

#[tokio::test]
async fn test_create_task_unknown_project_is_not_found() {
    let (_tmp, state) = test_state();

    let result = state.tasks.create("Orphan", None, None, 999);
    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert!(state.tasks.get_all().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_task_rejects_unknown_status() {
    let (_tmp, state) = test_state();
    let project = project_id(&state).await;

    let result = state.tasks.create("Bad", None, Some("archived"), project);
    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(state.tasks.get_all().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_task_rejects_malformed_due_date() {
    let (_tmp, state) = test_state();
    let project = project_id(&state).await;

    let result = state
        .tasks
        .create("Bad date", Some("next tuesday"), None, project);
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_set_status_rejects_unknown_value_and_preserves_state() {
    let (_tmp, state) = test_state();
    let project = project_id(&state).await;
    let task = state.tasks.create("Stable", None, None, project).unwrap();

    let result = state.tasks.set_status(task.id, "archived");
    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(state.tasks.get(task.id).unwrap().status, TaskStatus::Pending);
}

#[tokio::test]
async fn test_set_status_walks_the_enum() {
    let (_tmp, state) = test_state();
    let project = project_id(&state).await;
    let task = state.tasks.create("Progressing", None, None, project).unwrap();

    let task = state.tasks.set_status(task.id, "in-progress").unwrap();
    assert_eq!(task.status, TaskStatus::InProgress);

    let task = state.tasks.set_status(task.id, "completed").unwrap();
    assert_eq!(task.status, TaskStatus::Completed);

    assert!(matches!(
        state.tasks.set_status(999, "pending"),
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_partial_update_only_touches_supplied_fields() {
    let (_tmp, state) = test_state();
    let project = project_id(&state).await;
    let task = state
        .tasks
        .create("Original", Some("2026-09-01"), Some("in-progress"), project)
        .unwrap();

    let updated = state
        .tasks
        .update(
            task.id,
            &UpdateTaskRequest {
                title: Some("Renamed".to_string()),
                due_date: None,
                status: None,
                project_id: None,
            },
        )
        .unwrap();

    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.status, TaskStatus::InProgress);
    assert_eq!(updated.due_date, task.due_date);
    assert_eq!(updated.project_id, project);
}

#[tokio::test]
async fn test_partial_update_clears_due_date_with_empty_string() {
    let (_tmp, state) = test_state();
    let project = project_id(&state).await;
    let task = state
        .tasks
        .create("Dated", Some("2026-09-01"), None, project)
        .unwrap();

    let updated = state
        .tasks
        .update(
            task.id,
            &UpdateTaskRequest {
                title: None,
                due_date: Some(String::new()),
                status: None,
                project_id: None,
            },
        )
        .unwrap();

    assert_eq!(updated.due_date, None);
    assert_eq!(state.tasks.get(task.id).unwrap().due_date, None);
}

#[tokio::test]
async fn test_partial_update_validates_new_project() {
    let (_tmp, state) = test_state();
    let project = project_id(&state).await;
    let task = state.tasks.create("Homeless", None, None, project).unwrap();

    let result = state.tasks.update(
        task.id,
        &UpdateTaskRequest {
            title: None,
            due_date: None,
            status: None,
            project_id: Some(999),
        },
    );
    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(state.tasks.get(task.id).unwrap().project_id, project);
}

#[tokio::test]
async fn test_delete_task() {
    let (_tmp, state) = test_state();
    let project = project_id(&state).await;
    let task = state.tasks.create("Short lived", None, None, project).unwrap();

    state.tasks.delete(task.id).unwrap();
    assert!(matches!(
        state.tasks.get(task.id),
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        state.tasks.delete(task.id),
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_get_all_orders_by_due_date() {
    let (_tmp, state) = test_state();
    let project = project_id(&state).await;

    state
        .tasks
        .create("Later", Some("2026-12-01"), None, project)
        .unwrap();
    state
        .tasks
        .create("Sooner", Some("2026-08-10"), None, project)
        .unwrap();

    let all = state.tasks.get_all().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].title, "Sooner");
    assert_eq!(all[1].title, "Later");
}
