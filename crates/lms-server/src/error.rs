//! API error types with JSON responses.

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use lms_scorm::ScormError;
use lms_store::{StoreError, lms_core::OrderingError};
use serde::Serialize;

/// API error that can be returned from handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad request (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Unauthorized (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Forbidden (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Internal server error (500).
    #[error("internal error: {0}")]
    Internal(String),

    /// Malformed or oversized multipart body.
    #[error("invalid upload: {0}")]
    Multipart(#[from] MultipartError),

    /// Store error.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ScormError> for ApiError {
    fn from(err: ScormError) -> Self {
        Self::Store(StoreError::Scorm(err))
    }
}

impl ApiError {
    /// Get the error code string for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Multipart(_) => "INVALID_UPLOAD",
            Self::Store(e) => match e {
                StoreError::NotFound { .. } => "NOT_FOUND",
                StoreError::PermissionDenied(_) => "PERMISSION_DENIED",
                StoreError::Validation(_) => "VALIDATION_FAILED",
                StoreError::InvalidState(_) => "INVALID_STATE",
                StoreError::Ordering(OrderingError::LessonNotInChapter { .. }) => {
                    "LESSON_NOT_IN_CHAPTER"
                }
                StoreError::Ordering(OrderingError::DuplicateLessonReference { .. }) => {
                    "DUPLICATE_LESSON_REFERENCE"
                }
                StoreError::Ordering(OrderingError::ChapterMismatch { .. }) => "CHAPTER_MISMATCH",
                StoreError::Scorm(scorm) => scorm_code(scorm),
                _ if e.is_unique_violation() => "DUPLICATE_ENTRY",
                _ => "STORAGE_ERROR",
            },
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Multipart(e) => e.status(),
            Self::Store(e) => match e {
                StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
                StoreError::PermissionDenied(_) => StatusCode::FORBIDDEN,
                StoreError::Validation(_) | StoreError::InvalidState(_) => StatusCode::BAD_REQUEST,
                StoreError::Ordering(OrderingError::ChapterMismatch { .. }) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                StoreError::Ordering(_) => StatusCode::BAD_REQUEST,
                StoreError::Scorm(scorm) if scorm.is_client_error() => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                _ if e.is_unique_violation() => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Message shown to clients. Server-side failures are not described.
    pub fn client_message(&self) -> String {
        if self.status_code().is_server_error() {
            "internal server error".to_string()
        } else {
            self.to_string()
        }
    }
}

fn scorm_code(err: &ScormError) -> &'static str {
    match err {
        ScormError::InvalidArchive(_) => "SCORM_INVALID_ARCHIVE",
        ScormError::MissingManifest => "SCORM_MISSING_MANIFEST",
        ScormError::NoLaunchableResource(_) => "SCORM_NO_LAUNCHABLE_RESOURCE",
        ScormError::InvalidManifest(_) => "SCORM_INVALID_MANIFEST",
        ScormError::InvalidPath(_) => "SCORM_INVALID_PATH",
        ScormError::Walk(_) | ScormError::Io(_) => "SCORM_IO_ERROR",
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error details.
    pub error: ErrorDetails,
}

/// Error details within the response.
#[derive(Debug, Serialize)]
pub struct ErrorDetails {
    /// Error code (e.g., "NOT_FOUND", "BAD_REQUEST").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.code(), "Request failed");
        }
        let body = ErrorResponse {
            error: ErrorDetails {
                code: self.code().to_string(),
                message: self.client_message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Successful workflow payload: `{ "ok": true, ...body }`.
#[derive(Debug, Serialize)]
pub struct WorkflowOk<T> {
    ok: bool,
    #[serde(flatten)]
    body: T,
}

impl<T: Serialize> WorkflowOk<T> {
    pub fn new(body: T) -> Json<Self> {
        Json(Self { ok: true, body })
    }
}

/// Workflow failure rendered as `{ "ok": false, "error": "<message>" }`.
#[derive(Debug)]
pub struct WorkflowError(pub ApiError);

impl From<ApiError> for WorkflowError {
    fn from(err: ApiError) -> Self {
        Self(err)
    }
}

impl From<StoreError> for WorkflowError {
    fn from(err: StoreError) -> Self {
        Self(err.into())
    }
}

#[derive(Serialize)]
struct WorkflowFailure {
    ok: bool,
    error: String,
}

impl IntoResponse for WorkflowError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Workflow failed");
        }
        let body = WorkflowFailure {
            ok: false,
            error: self.0.client_message(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for workflow handlers.
pub type WorkflowResult<T> = Result<Json<WorkflowOk<T>>, WorkflowError>;

#[cfg(test)]
mod tests {
    use std::path::Path;

    use lms_scorm::{AssetRoot, ScormImporter};
    use lms_store::lms_core::CourseId;

    use super::*;

    #[test]
    fn test_store_errors_map_to_status() {
        let not_found: ApiError = StoreError::not_found("chapter", "c1").into();
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.code(), "NOT_FOUND");
        assert_eq!(not_found.to_string(), "chapter not found: c1");

        let denied: ApiError = StoreError::PermissionDenied("x requires role Moderator".into()).into();
        assert_eq!(denied.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(denied.code(), "PERMISSION_DENIED");

        let state: ApiError = StoreError::InvalidState("Invalid join link".into()).into();
        assert_eq!(state.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(state.client_message(), "Invalid join link");
    }

    #[test]
    fn test_scorm_client_errors_are_unprocessable() {
        let err: ApiError = ScormError::MissingManifest.into();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.code(), "SCORM_MISSING_MANIFEST");
        assert_eq!(err.client_message(), "package contains no imsmanifest.xml");

        let io: ApiError = ScormError::Io(std::io::Error::other("disk")).into();
        assert_eq!(io.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(io.client_message(), "internal server error");
    }

    #[test]
    fn test_scorm_messages_hide_server_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("srv").join("public");
        let importer = ScormImporter::new(AssetRoot::new(&root, tmp.path().join("private")));

        let archive = tmp.path().join("broken.zip");
        std::fs::write(&archive, "not a zip").unwrap();
        let cases = [archive.clone(), write_without_manifest(tmp.path())];

        for archive in cases {
            let err: ApiError = importer
                .import(CourseId::new(), "Unit", &archive)
                .unwrap_err()
                .into();
            assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
            let message = err.client_message();
            assert!(!message.contains(&*tmp.path().to_string_lossy()), "{}", message);
        }
    }

    fn write_without_manifest(dir: &Path) -> std::path::PathBuf {
        use std::io::Write;

        let path = dir.join("no-manifest.zip");
        let mut zip = zip::ZipWriter::new(std::fs::File::create(&path).unwrap());
        zip.start_file("index.html", zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"<html></html>").unwrap();
        zip.finish().unwrap();
        path
    }

    #[test]
    fn test_workflow_ok_flattens_body() {
        #[derive(Serialize)]
        struct Body {
            status: &'static str,
        }
        let Json(ok) = WorkflowOk::new(Body { status: "approved" });
        let value = serde_json::to_value(ok).unwrap();
        assert_eq!(value, serde_json::json!({ "ok": true, "status": "approved" }));
    }

    #[tokio::test]
    async fn test_workflow_error_body() {
        let err = WorkflowError::from(StoreError::InvalidState("Invalid Join Request".into()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value, serde_json::json!({ "ok": false, "error": "Invalid Join Request" }));
    }
}
