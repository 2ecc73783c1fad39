//! Error types for the storage layer.

use lms_core::{CoreError, OrderingError, UnknownVariant};
use lms_scorm::ScormError;
use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database connection or query error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A record does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// The caller lacks the role or relationship an operation requires.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Client input was rejected.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A workflow precondition did not hold (e.g. a join request in the
    /// wrong status).
    #[error("{0}")]
    InvalidState(String),

    /// Lesson ordering error.
    #[error(transparent)]
    Ordering(#[from] OrderingError),

    /// SCORM import or removal error.
    #[error(transparent)]
    Scorm(#[from] ScormError),

    /// A persisted value could not be decoded.
    #[error("corrupt row: {0}")]
    Corrupt(#[from] UnknownVariant),

    /// A blocking filesystem task panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Migration error.
    #[error("migration error: {0}")]
    MigrationError(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl StoreError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Whether the database rejected a duplicate key.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::Database(sqlx::Error::Database(db)) if db.is_unique_violation())
    }
}

impl From<CoreError> for StoreError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::PermissionDenied { user, required } => {
                Self::PermissionDenied(format!("{} requires role {}", user, required))
            }
            CoreError::InvalidField { .. } => Self::Validation(err.to_string()),
        }
    }
}
