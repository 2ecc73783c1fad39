//! Error types shared by every layer.

use thiserror::Error;

/// Errors raised by core validation and role checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The caller lacks the role an operation requires.
    #[error("permission denied: {user} requires role {required}")]
    PermissionDenied { user: String, required: String },

    /// A client-supplied field failed validation.
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl CoreError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

/// Reject empty or whitespace-only text fields.
pub fn require_non_empty(field: &'static str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        Err(CoreError::invalid(field, "must not be empty"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_check() {
        assert!(require_non_empty("title", "Intro").is_ok());
        assert_eq!(
            require_non_empty("title", "   ").unwrap_err().to_string(),
            "invalid title: must not be empty"
        );
    }
}
