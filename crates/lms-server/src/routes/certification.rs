//! Evaluation and certificate routes.
//!
//! - POST /api/evaluations - Record an evaluation (stars 0 to 5)
//! - POST /api/certificates - Issue or update a certificate
//! - GET /api/members/{member}/certificates - A member's certificates
//! - GET /api/certified-participants - Members holding a published certificate

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use lms_store::lms_core::{Certificate, CertificateId, CertifiedParticipant, EvaluationId};
use lms_store::{CertificateInput, EvaluationInput};
use serde::Serialize;

use crate::auth::CallerIdentity;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SavedEvaluation {
    pub id: EvaluationId,
}

#[derive(Debug, Serialize)]
pub struct SavedCertificate {
    pub id: CertificateId,
}

/// POST /api/evaluations - Save evaluation details.
///
/// One evaluation exists per member and course; saving again updates it.
/// Requires `Batch Evaluator` or `Moderator`.
async fn save_evaluation(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    Json(input): Json<EvaluationInput>,
) -> ApiResult<Json<SavedEvaluation>> {
    let id = state.repository().save_evaluation(&caller, &input).await?;
    Ok(Json(SavedEvaluation { id }))
}

/// POST /api/certificates - Save certificate details.
async fn save_certificate(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    Json(input): Json<CertificateInput>,
) -> ApiResult<Json<SavedCertificate>> {
    let id = state.repository().save_certificate(&caller, &input).await?;
    Ok(Json(SavedCertificate { id }))
}

/// GET /api/members/{member}/certificates - Certificates of one member, newest first.
async fn member_certificates(
    State(state): State<AppState>,
    CallerIdentity(_caller): CallerIdentity,
    Path(member): Path<String>,
) -> ApiResult<Json<Vec<Certificate>>> {
    Ok(Json(state.repository().certificates(&member).await?))
}

/// GET /api/certified-participants - Public list of certified members.
async fn certified_participants(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<CertifiedParticipant>>> {
    Ok(Json(state.repository().certified_participants().await?))
}

/// Build certification routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/evaluations", post(save_evaluation))
        .route("/api/certificates", post(save_certificate))
        .route("/api/members/{member}/certificates", get(member_certificates))
        .route("/api/certified-participants", get(certified_participants))
}
