//! Research helper - personal research organizer backend.
//!
//! Entry point for the REST server. Run with no arguments to serve, or
//! with the `migrate` argument to move legacy id-keyed project
//! directories to sanitized-name directories and exit.

use axum::routing::{get, patch, post, put};
use axum::Router;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tracing_subscriber::EnvFilter;

use research_helper::{handlers, server_port, AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let state = Arc::new(AppState::new().expect("Failed to initialize application state"));

    if std::env::args().nth(1).as_deref() == Some("migrate") {
        state
            .projects
            .migrate_directories()
            .await
            .expect("Project directory migration failed");
        return;
    }

    let app = Router::new()
        // Root liveness endpoint
        .route("/", get(handlers::index))
        // Project routes
        .route(
            "/projects",
            get(handlers::list_projects).post(handlers::create_project),
        )
        .route(
            "/projects/{id}",
            get(handlers::get_project).delete(handlers::delete_project),
        )
        // Note routes
        .route("/notes", get(handlers::list_notes).post(handlers::create_note))
        .route("/notes/{id}", put(handlers::update_note))
        // Citation routes
        .route(
            "/citations",
            get(handlers::list_citations).post(handlers::create_citation),
        )
        .route("/citations/arxiv", post(handlers::import_arxiv_citation))
        .route("/citations/pdf/{id}", get(handlers::citation_pdf))
        .route("/citations/search/arxiv", get(handlers::search_arxiv))
        // Task routes
        .route("/tasks", get(handlers::list_tasks).post(handlers::create_task))
        .route(
            "/tasks/{id}",
            put(handlers::update_task).delete(handlers::delete_task),
        )
        .route("/tasks/{id}/status", patch(handlers::update_task_status))
        // Static access to the data tree (note files, PDFs)
        .nest_service("/data", ServeDir::new(state.data_dir.clone()))
        .with_state(state.clone());

    let addr = format!("127.0.0.1:{}", server_port());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind server port");

    tracing::info!(
        addr = %addr,
        data_dir = %state.data_dir.display(),
        "research helper server running"
    );

    axum::serve(listener, app).await.expect("Server error");
}
