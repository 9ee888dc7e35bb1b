//! Citation store: downloaded PDFs plus bibliographic metadata rows.
//!
//! Creating a citation streams the remote PDF into the project's
//! `citations/` directory chunk by chunk and only inserts the row once the
//! write has completed and been flushed. A failed or interrupted download
//! never leaves a row behind, and a partial file is removed best-effort.

use crate::arxiv::extract_arxiv_id;
use crate::db::{citation_from_row, Database};
use crate::error::AppError;
use crate::models::Citation;
use crate::paths::sanitize_collapsed;
use crate::projects::ProjectStore;
use crate::url_validator::validate_download_url;
use chrono::Utc;
use futures_util::StreamExt;
use rusqlite::{params, OptionalExtension};
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use url::Url;

#[cfg(test)]
#[path = "citations_test.rs"]
mod citations_test;

#[derive(Clone)]
pub struct CitationStore {
    db: Database,
    projects: ProjectStore,
}

impl CitationStore {
    pub fn new(db: Database, projects: ProjectStore) -> Self {
        Self { db, projects }
    }

    /// Download the PDF at `url` into the project's citations directory and
    /// record it. The row is inserted only after the file write completes.
    pub async fn create(&self, title: &str, url: &str, project_id: i64) -> Result<Citation, AppError> {
        let title = title.trim();
        if title.is_empty() || url.trim().is_empty() {
            return Err(AppError::Validation(
                "Title, URL, and project_id are required".to_string(),
            ));
        }

        let project = self.projects.get(project_id)?;
        let parsed_url = validate_download_url(url)?;

        let citations_dir = Path::new(&project.directory_path).join("citations");
        fs::create_dir_all(&citations_dir).await?;

        let file_name = format!("{}.pdf", sanitize_collapsed(title));
        let path = citations_dir.join(&file_name);

        info!(url = %parsed_url, path = %path.display(), "downloading PDF");
        download_to_file(parsed_url, &path).await?;

        let file_path = path.to_string_lossy().to_string();
        let created_at = Utc::now();

        let conn = self.db.lock()?;
        conn.execute(
            "INSERT INTO citations (title, url, file_path, project_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![title, url, file_path, project_id, created_at],
        )?;
        let id = conn.last_insert_rowid();

        Ok(Citation {
            id,
            title: title.to_string(),
            url: url.to_string(),
            file_path,
            annotations: Vec::new(),
            project_id,
            created_at,
        })
    }

    pub fn get_all(&self) -> Result<Vec<Citation>, AppError> {
        let conn = self.db.lock()?;
        let mut stmt =
            conn.prepare("SELECT * FROM citations ORDER BY created_at DESC, id DESC")?;
        let citations = stmt
            .query_map([], |row| citation_from_row(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(citations)
    }

    pub fn get(&self, id: i64) -> Result<Citation, AppError> {
        let conn = self.db.lock()?;
        conn.query_row("SELECT * FROM citations WHERE id = ?1", [id], |row| {
            citation_from_row(row)
        })
        .optional()?
        .ok_or_else(|| AppError::NotFound("Citation not found".to_string()))
    }

    /// Read the stored PDF. A missing row and a missing file are distinct
    /// not-found conditions.
    pub async fn serve_pdf(&self, id: i64) -> Result<Vec<u8>, AppError> {
        let citation = self.get(id)?;
        match fs::read(&citation.file_path).await {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(AppError::NotFound(
                "PDF file not found on disk".to_string(),
            )),
            Err(err) => Err(err.into()),
        }
    }

    /// Import one arXiv search result as a citation: the title gets an
    /// identifying `[arXiv:<id>]` suffix and the PDF URL is downloaded via
    /// [`CitationStore::create`].
    pub async fn import_arxiv(
        &self,
        entry_id: &str,
        title: &str,
        pdf_url: &str,
        project_id: i64,
    ) -> Result<Citation, AppError> {
        let short_id = extract_arxiv_id(entry_id).unwrap_or_else(|| {
            entry_id
                .rsplit('/')
                .next()
                .unwrap_or(entry_id)
                .to_string()
        });
        let titled = format!("{} [arXiv:{}]", title.trim(), short_id);
        self.create(&titled, pdf_url, project_id).await
    }
}

// ============================================================================
// Download
// ============================================================================

/// GET `url` and stream the body into `path`. A non-success status fails
/// before the file is created; a mid-stream failure removes the partial
/// file best-effort. No timeout beyond the client defaults is imposed.
async fn download_to_file(url: Url, path: &Path) -> Result<(), AppError> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| AppError::Download(format!("download failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::Download(format!(
            "download failed: upstream returned {}",
            status
        )));
    }

    let mut file = fs::File::create(path).await?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let bytes = match chunk {
            Ok(bytes) => bytes,
            Err(err) => {
                remove_partial(path).await;
                return Err(AppError::Download(format!(
                    "download interrupted: {}",
                    err
                )));
            }
        };
        if let Err(err) = file.write_all(&bytes).await {
            remove_partial(path).await;
            return Err(err.into());
        }
    }
    file.flush().await?;
    Ok(())
}

async fn remove_partial(path: &Path) {
    if let Err(err) = fs::remove_file(path).await {
        warn!(path = %path.display(), error = %err, "failed to remove partial download");
    }
}
