//! Snippet attachments (video/image clips referenced by alerts).

use std::path::{Path, PathBuf};

use axum::{
    extract::{Path as UrlPath, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::app::AppState;
use crate::error::ApiError;

const NOT_FOUND: &str = "Snippet not found";

/// Creates the snippet directory if it does not exist yet.
pub async fn ensure_snippets_dir(dir: &Path) -> std::io::Result<()> {
    tokio::fs::create_dir_all(dir).await
}

/// Resolves `filename` inside `dir`. Names that could escape the
/// directory resolve to nothing.
fn snippet_path(dir: &Path, filename: &str) -> Option<PathBuf> {
    let invalid = filename.is_empty()
        || filename.starts_with('.')
        || filename.contains(['/', '\\'])
        || filename.contains('\0');
    if invalid {
        return None;
    }
    Some(dir.join(filename))
}

/// GET /snippets/:filename
pub async fn get_snippet(
    State(state): State<AppState>,
    UrlPath(filename): UrlPath<String>,
) -> Result<Response, ApiError> {
    let path = snippet_path(&state.config.snippets.dir, &filename)
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))?;

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::NotFound(NOT_FOUND.to_string()));
        }
        // Directories land here on most platforms.
        Err(e) if path.is_dir() => {
            tracing::debug!(error = %e, "Snippet path is a directory");
            return Err(ApiError::NotFound(NOT_FOUND.to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    Ok(([(header::CONTENT_TYPE, mime.to_string())], bytes).into_response())
}
