//! Chapter routes, including SCORM-backed chapters.
//!
//! - POST /api/chapters - Create or update a chapter, importing its package
//! - DELETE /api/chapters/{chapter} - Delete a chapter and its package directory
//! - DELETE /api/chapters/{chapter}/lessons/{lesson} - Delete a lesson

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, post},
};
use lms_store::ChapterInput;
use lms_store::lms_core::{Chapter, ChapterId, LessonId};
use serde::Serialize;

use crate::auth::CallerIdentity;
use crate::error::ApiResult;
use crate::state::AppState;

/// Response for the delete routes.
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub id: uuid::Uuid,
    pub message: String,
}

/// POST /api/chapters - Create or update a chapter.
///
/// # Request
///
/// Body: `{ "id"?: "...", "course": "...", "title": "...", "scorm_package"?: "/files/x.zip" }`
///
/// With `scorm_package` the uploaded archive is extracted under
/// `files/scorm/<course>/<title>` and the chapter records its launch file.
///
/// # Response
///
/// - 200 OK: the stored chapter
/// - 403 Forbidden: caller cannot author courses
/// - 422 Unprocessable Entity: the archive is not an importable SCORM package
async fn upsert_chapter(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    Json(input): Json<ChapterInput>,
) -> ApiResult<Json<Chapter>> {
    Ok(Json(state.repository().upsert_chapter(&caller, &input).await?))
}

/// DELETE /api/chapters/{chapter} - Delete a chapter.
async fn delete_chapter(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    Path(id): Path<ChapterId>,
) -> ApiResult<Json<DeletedResponse>> {
    state.repository().delete_chapter(&caller, id).await?;
    Ok(Json(DeletedResponse {
        id: id.0,
        message: "Chapter deleted".to_string(),
    }))
}

/// DELETE /api/chapters/{chapter}/lessons/{lesson} - Delete a lesson.
///
/// The remaining lessons of the chapter are renumbered without gaps.
async fn delete_lesson(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    Path((chapter, lesson)): Path<(ChapterId, LessonId)>,
) -> ApiResult<Json<DeletedResponse>> {
    state
        .repository()
        .delete_lesson(&caller, lesson, chapter)
        .await?;
    Ok(Json(DeletedResponse {
        id: lesson.0,
        message: "Lesson deleted".to_string(),
    }))
}

/// Build chapter routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/chapters", post(upsert_chapter))
        .route("/api/chapters/{chapter}", delete(delete_chapter))
        .route("/api/chapters/{chapter}/lessons/{lesson}", delete(delete_lesson))
}
