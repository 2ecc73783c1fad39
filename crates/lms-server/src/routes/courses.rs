//! Course routes.
//!
//! - POST /api/courses - Create a course
//! - GET /api/courses/{id} - Course outline with chapters and lessons in order
//! - DELETE /api/courses/{id} - Delete a course and its extracted packages
//! - POST /api/courses/{id}/reviews - Review a course the caller is enrolled in
//! - POST /api/courses/statistics - Refresh cached lesson, enrollment and rating figures

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use lms_store::CourseInput;
use lms_store::lms_core::{Course, CourseId, CourseOutline, ReviewInput};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::CallerIdentity;
use crate::error::ApiResult;
use crate::state::AppState;

/// Response for DELETE /api/courses/{id}.
#[derive(Debug, Serialize)]
pub struct DeleteCourseResponse {
    pub id: CourseId,
    pub message: String,
}

/// Body of POST /api/courses/{id}/reviews. `rating` is in stars, 0 to 5.
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub rating: f64,
    #[serde(default)]
    pub review: Option<String>,
}

/// Response for POST /api/courses/{id}/reviews.
#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub course: CourseId,
}

/// Response for POST /api/courses/statistics.
#[derive(Debug, Serialize)]
pub struct StatisticsResponse {
    pub updated: u64,
}

/// POST /api/courses - Create a course.
///
/// Requires `Course Creator` or `Moderator`.
async fn create_course(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    Json(input): Json<CourseInput>,
) -> ApiResult<(StatusCode, Json<Course>)> {
    let course = state.repository().create_course(&caller, &input).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

/// GET /api/courses/{id} - Course outline.
async fn course_outline(
    State(state): State<AppState>,
    Path(id): Path<CourseId>,
) -> ApiResult<Json<CourseOutline>> {
    Ok(Json(state.repository().course_outline(id).await?))
}

/// DELETE /api/courses/{id} - Delete a course.
async fn delete_course(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    Path(id): Path<CourseId>,
) -> ApiResult<Json<DeleteCourseResponse>> {
    state.repository().delete_course(&caller, id).await?;
    Ok(Json(DeleteCourseResponse {
        id,
        message: "Course deleted".to_string(),
    }))
}

/// POST /api/courses/{id}/reviews - Save the caller's review.
async fn save_review(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    Path(id): Path<CourseId>,
    Json(request): Json<ReviewRequest>,
) -> ApiResult<(StatusCode, Json<ReviewResponse>)> {
    let input = ReviewInput {
        course: id,
        rating: request.rating,
        review: request.review,
    };
    let review = state.repository().save_review(&caller, &input).await?;
    Ok((StatusCode::CREATED, Json(ReviewResponse { id: review, course: id })))
}

/// POST /api/courses/statistics - Recount every course.
///
/// Requires `System Manager` or `Moderator`.
async fn update_statistics(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
) -> ApiResult<Json<StatisticsResponse>> {
    let updated = state.repository().update_course_statistics(&caller).await?;
    Ok(Json(StatisticsResponse { updated }))
}

/// Build course routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/courses", post(create_course))
        .route("/api/courses/statistics", post(update_statistics))
        .route("/api/courses/{id}", get(course_outline).delete(delete_course))
        .route("/api/courses/{id}/reviews", post(save_review))
}
