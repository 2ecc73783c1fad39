//! Cohort workflow routes.
//!
//! These keep the `{ "ok": true, ... }` / `{ "ok": false, "error": "..." }`
//! payload shape.
//!
//! - POST /api/cohorts/join - Request to join a subgroup through its invite link
//! - POST /api/join-requests/{id}/{decision} - approve, reject or undo-reject
//! - POST /api/subgroups/{id}/mentors - Add a mentor to a subgroup

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use lms_store::JoinOutcome;
use lms_store::lms_core::{CourseId, JoinDecision, JoinRequest, JoinRequestId, SubgroupId};
use serde::{Deserialize, Serialize};

use crate::auth::CallerIdentity;
use crate::error::{ApiError, WorkflowOk, WorkflowResult};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for POST /api/cohorts/join.
#[derive(Debug, Deserialize)]
pub struct JoinCohortRequest {
    pub course: CourseId,
    /// Cohort slug.
    pub cohort: String,
    /// Subgroup slug.
    pub subgroup: String,
    pub invite_code: String,
}

#[derive(Debug, Serialize)]
pub struct DecisionResponse {
    pub request: JoinRequest,
}

/// Request body for POST /api/subgroups/{id}/mentors.
#[derive(Debug, Deserialize)]
pub struct AddMentorRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct AddMentorResponse {
    /// False when the user already mentors the subgroup.
    pub added: bool,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /api/cohorts/join - Join a subgroup.
///
/// # Response
///
/// - 200 OK: `{ "ok": true, "status": "record created" | "record found", "request": {...} }`
/// - 400 Bad Request: `{ "ok": false, "error": "Invalid join link" }`
async fn join_cohort(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    Json(request): Json<JoinCohortRequest>,
) -> WorkflowResult<JoinOutcome> {
    let outcome = state
        .repository()
        .join_cohort(
            &caller,
            request.course,
            &request.cohort,
            &request.subgroup,
            &request.invite_code,
        )
        .await?;
    Ok(WorkflowOk::new(outcome))
}

/// POST /api/join-requests/{id}/{decision} - Decide on a join request.
///
/// `decision` is `approve`, `reject` or `undo-reject`. Only the cohort's
/// admins, the subgroup's mentors and system managers may decide.
///
/// # Response
///
/// - 200 OK: `{ "ok": true, "request": {...} }`
/// - 400 Bad Request: `{ "ok": false, "error": "Invalid Join Request" }`
/// - 403 Forbidden: caller does not manage the subgroup
async fn decide_join_request(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    Path((id, decision)): Path<(JoinRequestId, String)>,
) -> WorkflowResult<DecisionResponse> {
    let decision = parse_decision(&decision)?;
    let request = state
        .repository()
        .decide_join_request(&caller, id, decision)
        .await?;
    Ok(WorkflowOk::new(DecisionResponse { request }))
}

fn parse_decision(raw: &str) -> Result<JoinDecision, ApiError> {
    match raw {
        "approve" => Ok(JoinDecision::Approve),
        "reject" => Ok(JoinDecision::Reject),
        "undo-reject" => Ok(JoinDecision::UndoReject),
        other => Err(ApiError::NotFound(format!("unknown decision {}", other))),
    }
}

/// POST /api/subgroups/{id}/mentors - Add a mentor.
///
/// # Response
///
/// - 200 OK: `{ "ok": true, "added": true }`
/// - 403 Forbidden: caller is not a cohort admin
/// - 404 Not Found: unknown subgroup or user
async fn add_mentor(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    Path(id): Path<SubgroupId>,
    Json(request): Json<AddMentorRequest>,
) -> WorkflowResult<AddMentorResponse> {
    let added = state
        .repository()
        .add_mentor(&caller, id, request.email.trim())
        .await?;
    Ok(WorkflowOk::new(AddMentorResponse { added }))
}

/// Build cohort workflow routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/cohorts/join", post(join_cohort))
        .route("/api/join-requests/{id}/{decision}", post(decide_join_request))
        .route("/api/subgroups/{id}/mentors", post(add_mentor))
}
