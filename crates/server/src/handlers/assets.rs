use crate::http_api::{HttpError, HttpResult};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::header::CONTENT_TYPE,
    response::IntoResponse,
};
use std::path::{Component, Path as FsPath, PathBuf};
use std::sync::Arc;

/// `GET /static/*path`
pub async fn serve(
    State(state): State<Arc<AppState>>,
    Path(rel): Path<String>,
) -> HttpResult {
    let Some(path) = resolve_static(&state.static_dir, &rel) else {
        return Err(HttpError::not_found(format!("Not found: /static/{rel}")));
    };
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| HttpError::not_found(format!("Not found: /static/{rel}")))?;
    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    Ok(([(CONTENT_TYPE, mime.to_string())], bytes).into_response())
}

/// Join `rel` onto `root`, rejecting anything but plain path segments.
fn resolve_static(root: &FsPath, rel: &str) -> Option<PathBuf> {
    let rel = FsPath::new(rel.trim_start_matches('/'));
    if rel.as_os_str().is_empty() {
        return None;
    }
    if !rel.components().all(|c| matches!(c, Component::Normal(_))) {
        return None;
    }
    Some(root.join(rel))
}
