//! File upload routes.
//!
//! - POST /api/files - Store a multipart upload and return its file URL
//! - GET /api/files/info - Name and size of an uploaded file

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use lms_scorm::FileInfo;
use lms_store::StoreError;
use serde::{Deserialize, Serialize};

use crate::auth::CallerIdentity;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Response for POST /api/files.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Root-relative URL of the stored file (`/files/...` or `/private/files/...`).
    pub file_url: String,
    /// Name the client sent.
    pub file_name: String,
    pub is_private: bool,
}

/// POST /api/files - Store an uploaded file.
///
/// # Request
///
/// Multipart body with a `file` part and an optional `is_private` part
/// (`1`/`true`).
///
/// # Response
///
/// - 201 Created: `{ "file_url": "/files/...", "file_name": "...", "is_private": false }`
/// - 400 Bad Request: no `file` part
/// - 413 Payload Too Large: body exceeds `MAX_UPLOAD_BYTES`
async fn upload_file(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadResponse>)> {
    let mut file: Option<(String, Bytes)> = None;
    let mut is_private = false;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| "upload".to_string());
                let bytes = field.bytes().await?;
                file = Some((file_name, bytes));
            }
            Some("is_private") => {
                let value = field.text().await?;
                is_private = matches!(value.trim(), "1" | "true");
            }
            _ => {}
        }
    }

    let (file_name, bytes) =
        file.ok_or_else(|| ApiError::BadRequest("missing file part".to_string()))?;
    if bytes.is_empty() {
        return Err(ApiError::BadRequest("uploaded file is empty".to_string()));
    }

    let assets = state.assets().clone();
    let stored_name = file_name.clone();
    let size = bytes.len();
    let file_url =
        tokio::task::spawn_blocking(move || assets.store_upload(&stored_name, &bytes, is_private))
            .await
            .map_err(StoreError::from)??;

    tracing::info!(file_url = %file_url, size, user = %caller.user, "File uploaded");

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            file_url,
            file_name,
            is_private,
        }),
    ))
}

/// Query for GET /api/files/info.
#[derive(Debug, Deserialize)]
pub struct FileInfoQuery {
    pub file_url: String,
}

/// GET /api/files/info?file_url=... - Describe an uploaded file.
///
/// - 200 OK: `{ "file_name": "...", "file_size": 123, "file_url": "..." }`
/// - 404 Not Found: no file at that URL
/// - 422 Unprocessable Entity: the URL is not an upload URL
async fn file_info(
    State(state): State<AppState>,
    CallerIdentity(_caller): CallerIdentity,
    Query(query): Query<FileInfoQuery>,
) -> ApiResult<Json<FileInfo>> {
    let assets = state.assets().clone();
    let file_url = query.file_url;
    let lookup = file_url.clone();
    let info = tokio::task::spawn_blocking(move || assets.file_info(&lookup))
        .await
        .map_err(StoreError::from)??;

    info.map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("file {} not found", file_url)))
}

/// Build upload routes accepting bodies up to `max_bytes`.
pub fn routes(max_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/api/files", post(upload_file))
        .route("/api/files/info", get(file_info))
        .layer(DefaultBodyLimit::max(max_bytes))
}
