//! HTTP route handlers: the boundary between the REST surface and the
//! stores. Handlers unwrap payloads, call the matching store operation,
//! and let `AppError` map failures to status codes.

use crate::arxiv;
use crate::error::AppError;
use crate::models::{
    ArxivPaper, ArxivSearchQuery, Citation, CreateCitationRequest, CreateProjectRequest,
    CreateTaskRequest, ImportArxivRequest, Note, NotePayload, Project, Task, UpdateTaskRequest,
    UpdateTaskStatusRequest,
};
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;

// ============================================================================
// Root
// ============================================================================

pub async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Research Helper API is running" }))
}

// ============================================================================
// Projects
// ============================================================================

pub async fn create_project(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<Project>), AppError> {
    let name = body.name.unwrap_or_default();
    let project = state.projects.create(&name).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn list_projects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Project>>, AppError> {
    Ok(Json(state.projects.get_all()?))
}

pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Project>, AppError> {
    Ok(Json(state.projects.get(id)?))
}

pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.projects.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Notes
// ============================================================================

fn unwrap_note_payload(body: NotePayload) -> Result<(String, String, Vec<String>, i64), AppError> {
    let (Some(title), Some(project_id)) = (body.title, body.project_id) else {
        return Err(AppError::Validation(
            "Title and project_id are required".to_string(),
        ));
    };
    Ok((
        title,
        body.content.unwrap_or_default(),
        body.tags.unwrap_or_default(),
        project_id,
    ))
}

pub async fn create_note(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NotePayload>,
) -> Result<(StatusCode, Json<Note>), AppError> {
    let (title, content, tags, project_id) = unwrap_note_payload(body)?;
    let note = state.notes.create(&title, &content, &tags, project_id).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn update_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<NotePayload>,
) -> Result<Json<Note>, AppError> {
    let (title, content, tags, project_id) = unwrap_note_payload(body)?;
    let note = state
        .notes
        .update(id, &title, &content, &tags, project_id)
        .await?;
    Ok(Json(note))
}

pub async fn list_notes(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Note>>, AppError> {
    Ok(Json(state.notes.get_all().await?))
}

// ============================================================================
// Citations
// ============================================================================

pub async fn create_citation(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateCitationRequest>,
) -> Result<(StatusCode, Json<Citation>), AppError> {
    let (Some(title), Some(url), Some(project_id)) = (body.title, body.url, body.project_id)
    else {
        return Err(AppError::Validation(
            "Title, URL, and project_id are required".to_string(),
        ));
    };
    let citation = state.citations.create(&title, &url, project_id).await?;
    Ok((StatusCode::CREATED, Json(citation)))
}

pub async fn import_arxiv_citation(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ImportArxivRequest>,
) -> Result<(StatusCode, Json<Citation>), AppError> {
    let (Some(id), Some(title), Some(pdf_url), Some(project_id)) =
        (body.id, body.title, body.pdf_url, body.project_id)
    else {
        return Err(AppError::Validation(
            "id, title, pdf_url, and project_id are required".to_string(),
        ));
    };
    let citation = state
        .citations
        .import_arxiv(&id, &title, &pdf_url, project_id)
        .await?;
    Ok((StatusCode::CREATED, Json(citation)))
}

pub async fn list_citations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Citation>>, AppError> {
    Ok(Json(state.citations.get_all()?))
}

pub async fn citation_pdf(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let bytes = state.citations.serve_pdf(id).await?;
    Ok(([(header::CONTENT_TYPE, "application/pdf")], bytes).into_response())
}

pub async fn search_arxiv(
    Query(params): Query<ArxivSearchQuery>,
) -> Result<Json<Vec<ArxivPaper>>, AppError> {
    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::Validation("Search query is required".to_string()))?;

    let papers = arxiv::search(
        query,
        params.start.unwrap_or(0),
        params.max_results.unwrap_or(10),
    )
    .await?;
    Ok(Json(papers))
}

// ============================================================================
// Tasks
// ============================================================================

pub async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    let (Some(title), Some(project_id)) = (body.title, body.project_id) else {
        return Err(AppError::Validation(
            "Title and project_id are required".to_string(),
        ));
    };
    let task = state.tasks.create(
        &title,
        body.due_date.as_deref(),
        body.status.as_deref(),
        project_id,
    )?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn list_tasks(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Task>>, AppError> {
    Ok(Json(state.tasks.get_all()?))
}

pub async fn update_task_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateTaskStatusRequest>,
) -> Result<Json<Task>, AppError> {
    let status = body.status.ok_or_else(|| {
        AppError::Validation(
            "Valid status is required (pending, in-progress, or completed)".to_string(),
        )
    })?;
    Ok(Json(state.tasks.set_status(id, &status)?))
}

pub async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateTaskRequest>,
) -> Result<Json<Task>, AppError> {
    Ok(Json(state.tasks.update(id, &body)?))
}

pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.tasks.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}
