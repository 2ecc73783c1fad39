//! Bulk document deletion.
//!
//! - POST /api/documents/delete - Delete documents of one kind (Moderator only)

use axum::{Json, Router, extract::State, routing::post};
use lms_store::lms_core::DocumentKind;
use serde::{Deserialize, Serialize};

use crate::auth::CallerIdentity;
use crate::error::ApiResult;
use crate::state::AppState;

/// Request body for POST /api/documents/delete.
#[derive(Debug, Deserialize)]
pub struct DeleteDocumentsRequest {
    /// Document kind, e.g. `"Course Lesson"`.
    pub doctype: DocumentKind,
    pub documents: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteDocumentsResponse {
    pub deleted: usize,
}

/// POST /api/documents/delete - Delete documents.
///
/// Ids are validated before anything is deleted. Deletion stops at the first
/// missing document.
///
/// # Response
///
/// - 200 OK: `{ "deleted": 3 }`
/// - 400 Bad Request: malformed id
/// - 403 Forbidden: caller is not a Moderator
/// - 404 Not Found: a document does not exist
async fn delete_documents(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    Json(request): Json<DeleteDocumentsRequest>,
) -> ApiResult<Json<DeleteDocumentsResponse>> {
    let deleted = state
        .repository()
        .delete_documents(&caller, request.doctype, &request.documents)
        .await?;
    Ok(Json(DeleteDocumentsResponse { deleted }))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/documents/delete", post(delete_documents))
}
