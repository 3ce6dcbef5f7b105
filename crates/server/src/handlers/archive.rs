use crate::http_api::{render, HttpError, HttpResult};
use crate::state::AppState;
use crate::views::ArchiveFragment;
use axum::{
    extract::State,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::IntoResponse,
};
use std::io::ErrorKind;
use std::sync::Arc;

fn archive_ui(state: &AppState) -> HttpResult {
    let view = ArchiveFragment {
        archive: state.archiver.snapshot().into(),
    };
    Ok(render(&view)?.into_response())
}

/// `POST /contacts/archive`
pub async fn start(State(state): State<Arc<AppState>>) -> HttpResult {
    if !state.archiver.start() {
        log::debug!("Archive already {}", state.archiver.status());
    }
    archive_ui(&state)
}

/// `GET /contacts/archive`, polled by the progress bar.
pub async fn status(State(state): State<Arc<AppState>>) -> HttpResult {
    archive_ui(&state)
}

/// `DELETE /contacts/archive`
pub async fn reset(State(state): State<Arc<AppState>>) -> HttpResult {
    state.archiver.reset();
    archive_ui(&state)
}

/// `GET /contacts/archive/file`: the archive is the contact DB file itself.
pub async fn download(State(state): State<Arc<AppState>>) -> HttpResult {
    let path = state.archiver.archive_file();
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "contacts.json".to_string());

    // Read under the store lock so a concurrent save cannot hand out a torn file.
    let content = {
        let _store = state.store.lock().await;
        tokio::fs::read(path).await
    };
    let content = match content {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(HttpError::not_found(format!(
                "Archive file not found: {file_name}"
            )))
        }
        Err(err) => {
            log::error!("Error reading archive file {}: {err}", path.display());
            return Err(HttpError::internal(format!(
                "Error reading archive file: {file_name}: {err}"
            )));
        }
    };

    let disposition = format!("attachment; filename=\"{}\"", file_name.replace('"', ""));
    Ok((
        [
            (CONTENT_TYPE, "application/json".to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        content,
    )
        .into_response())
}
