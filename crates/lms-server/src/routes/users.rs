//! Caller info and the member directory.
//!
//! - GET /api/me - The authenticated caller and role flags
//! - GET /api/members - One page of enabled members with their primary role
//! - GET /api/users - Every enabled user keyed by email
//! - POST /api/users - Create or update a profile and its roles

use std::collections::BTreeMap;

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use lms_store::lms_core::{Member, Role, UserProfile, UserSummary};
use serde::{Deserialize, Serialize};

use crate::auth::CallerIdentity;
use crate::error::ApiResult;
use crate::state::AppState;

/// Query for GET /api/members.
#[derive(Debug, Deserialize)]
pub struct MembersQuery {
    #[serde(default)]
    pub start: i64,
    #[serde(default)]
    pub search: Option<String>,
}

/// Response for POST /api/users.
#[derive(Debug, Serialize)]
pub struct SaveUserResponse {
    pub email: String,
    pub message: String,
}

/// Response for GET /api/me.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct MeResponse {
    pub user: String,
    pub roles: Vec<Role>,
    pub is_instructor: bool,
    pub is_moderator: bool,
    pub is_evaluator: bool,
}

/// GET /api/me - Describe the caller.
async fn me(CallerIdentity(caller): CallerIdentity) -> Json<MeResponse> {
    Json(MeResponse {
        is_instructor: caller.has_role(Role::CourseCreator),
        is_moderator: caller.has_role(Role::Moderator),
        is_evaluator: caller.has_role(Role::BatchEvaluator),
        roles: caller.roles.iter().copied().collect(),
        user: caller.user,
    })
}

/// GET /api/members - Members matching `search`, 20 per page from `start`.
async fn members(
    State(state): State<AppState>,
    CallerIdentity(_caller): CallerIdentity,
    Query(query): Query<MembersQuery>,
) -> ApiResult<Json<Vec<Member>>> {
    let members = state
        .repository()
        .members(query.search.as_deref(), query.start)
        .await?;
    Ok(Json(members))
}

/// GET /api/users - Enabled users keyed by email.
async fn all_users(
    State(state): State<AppState>,
    CallerIdentity(_caller): CallerIdentity,
) -> ApiResult<Json<BTreeMap<String, UserSummary>>> {
    Ok(Json(state.repository().all_users().await?))
}

/// POST /api/users - Save a profile with its site-wide roles.
///
/// Requires `System Manager` or `Moderator`.
async fn save_user(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    Json(profile): Json<UserProfile>,
) -> ApiResult<Json<SaveUserResponse>> {
    state.repository().save_user(&caller, &profile).await?;
    Ok(Json(SaveUserResponse {
        email: profile.email,
        message: "User saved".to_string(),
    }))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/me", get(me))
        .route("/api/members", get(members))
        .route("/api/users", get(all_users).post(save_user))
}
