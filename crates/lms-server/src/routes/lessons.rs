//! Lesson routes.
//!
//! - POST /api/lessons - Append a lesson to a chapter
//! - POST /api/lessons/reorder - Move a lesson within or across chapters
//! - POST /api/enrollments/current-lesson - Remember where a learner is

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::post,
};
use lms_store::LessonInput;
use lms_store::lms_core::{ChapterOrdering, CourseId, Lesson, LessonId, LessonMove};
use serde::{Deserialize, Serialize};

use crate::auth::CallerIdentity;
use crate::error::ApiResult;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Response for POST /api/lessons/reorder: the orderings now in effect.
#[derive(Debug, Serialize)]
pub struct ReorderResponse {
    pub chapters: Vec<ChapterOrdering>,
}

/// Request body for POST /api/enrollments/current-lesson.
#[derive(Debug, Deserialize)]
pub struct CurrentLessonRequest {
    pub course: CourseId,
    pub lesson: LessonId,
}

#[derive(Debug, Serialize)]
pub struct CurrentLessonResponse {
    /// False when the caller is not enrolled in the course.
    pub saved: bool,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /api/lessons - Create a lesson at the end of its chapter.
async fn create_lesson(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    Json(input): Json<LessonInput>,
) -> ApiResult<(StatusCode, Json<Lesson>)> {
    let lesson = state.repository().create_lesson(&caller, &input).await?;
    Ok((StatusCode::CREATED, Json(lesson)))
}

/// POST /api/lessons/reorder - Move a lesson.
///
/// # Request
///
/// Body: `{ "lesson": "...", "source": "...", "target": "...", "index": 0 }`
///
/// `index` is the 0-based position in the target chapter. Out-of-range
/// indices clamp to the end.
///
/// # Response
///
/// - 200 OK: `{ "chapters": [{ "chapter": "...", "lessons": [...] }] }`
/// - 400 Bad Request: the lesson is not in the source chapter
/// - 404 Not Found: unknown chapter
async fn reorder_lesson(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    Json(mv): Json<LessonMove>,
) -> ApiResult<Json<ReorderResponse>> {
    let plan = state.repository().reorder_lesson(&caller, &mv).await?;
    Ok(Json(ReorderResponse {
        chapters: plan.orderings().into_iter().cloned().collect(),
    }))
}

/// POST /api/enrollments/current-lesson - Save the caller's current lesson.
async fn save_current_lesson(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    Json(request): Json<CurrentLessonRequest>,
) -> ApiResult<Json<CurrentLessonResponse>> {
    let saved = state
        .repository()
        .save_current_lesson(&caller, request.course, request.lesson)
        .await?;
    Ok(Json(CurrentLessonResponse { saved }))
}

/// Build lesson routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/lessons", post(create_lesson))
        .route("/api/lessons/reorder", post(reorder_lesson))
        .route("/api/enrollments/current-lesson", post(save_current_lesson))
}
