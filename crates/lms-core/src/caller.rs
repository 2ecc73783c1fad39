//! Caller identity and site-wide roles.
//!
//! Every operation receives an explicit [`Caller`] instead of reading ambient
//! session state. Per-cohort roles (cohort admin, subgroup mentor) live in the
//! store; the roles here are the site-wide ones carried by the caller's token.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::UnknownVariant;

/// Site-wide role held by a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Moderator")]
    Moderator,
    #[serde(rename = "Course Creator")]
    CourseCreator,
    #[serde(rename = "Batch Evaluator")]
    BatchEvaluator,
    #[serde(rename = "LMS Student")]
    LmsStudent,
    #[serde(rename = "System Manager")]
    SystemManager,
}

impl Role {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Moderator => "Moderator",
            Self::CourseCreator => "Course Creator",
            Self::BatchEvaluator => "Batch Evaluator",
            Self::LmsStudent => "LMS Student",
            Self::SystemManager => "System Manager",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Moderator" => Ok(Self::Moderator),
            "Course Creator" => Ok(Self::CourseCreator),
            "Batch Evaluator" => Ok(Self::BatchEvaluator),
            "LMS Student" => Ok(Self::LmsStudent),
            "System Manager" => Ok(Self::SystemManager),
            other => Err(UnknownVariant {
                kind: "role",
                value: other.to_string(),
            }),
        }
    }
}

/// Roles that decide a member's primary role, highest first.
pub const PRIMARY_ROLE_ORDER: &[Role] = &[
    Role::Moderator,
    Role::CourseCreator,
    Role::BatchEvaluator,
    Role::LmsStudent,
];

/// The highest-ranked LMS role among `roles`.
///
/// `System Manager` is not an LMS role and never becomes primary.
#[must_use]
pub fn primary_role(roles: &[Role]) -> Option<Role> {
    PRIMARY_ROLE_ORDER
        .iter()
        .copied()
        .find(|role| roles.contains(role))
}

/// Roles allowed to create, edit, reorder and delete course content.
pub const AUTHORING_ROLES: &[Role] = &[Role::CourseCreator, Role::Moderator];

/// Roles allowed to record evaluations and issue certificates.
pub const EVALUATION_ROLES: &[Role] = &[Role::BatchEvaluator, Role::Moderator];

/// The authenticated user on whose behalf an operation runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    /// User identifier (email address).
    pub user: String,
    pub roles: BTreeSet<Role>,
}

impl Caller {
    pub fn new(user: impl Into<String>, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            user: user.into(),
            roles: roles.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    #[must_use]
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.iter().any(|r| self.has_role(*r))
    }

    #[must_use]
    pub fn is_system_manager(&self) -> bool {
        self.has_role(Role::SystemManager)
    }

    /// Fail with `PermissionDenied` unless the caller holds `role`.
    pub fn require_role(&self, role: Role) -> Result<(), CoreError> {
        self.require_any_role(&[role])
    }

    /// Fail with `PermissionDenied` unless the caller holds one of `roles`.
    pub fn require_any_role(&self, roles: &[Role]) -> Result<(), CoreError> {
        if self.has_any_role(roles) {
            return Ok(());
        }
        let required = roles
            .iter()
            .map(Role::as_str)
            .collect::<Vec<_>>()
            .join(" or ");
        Err(CoreError::PermissionDenied {
            user: self.user.clone(),
            required,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_names_roundtrip() {
        for role in [
            Role::Moderator,
            Role::CourseCreator,
            Role::BatchEvaluator,
            Role::LmsStudent,
            Role::SystemManager,
        ] {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_str()));
        }
    }

    #[test]
    fn primary_role_prefers_moderator() {
        assert_eq!(
            primary_role(&[Role::LmsStudent, Role::CourseCreator, Role::Moderator]),
            Some(Role::Moderator)
        );
        assert_eq!(
            primary_role(&[Role::LmsStudent, Role::BatchEvaluator]),
            Some(Role::BatchEvaluator)
        );
        assert_eq!(primary_role(&[Role::SystemManager]), None);
        assert_eq!(primary_role(&[]), None);
    }

    #[test]
    fn require_role_denies_missing_role() {
        let caller = Caller::new("student@example.com", [Role::LmsStudent]);
        let err = caller.require_role(Role::Moderator).unwrap_err();
        assert_eq!(
            err,
            CoreError::PermissionDenied {
                user: "student@example.com".to_string(),
                required: "Moderator".to_string(),
            }
        );
    }

    #[test]
    fn require_any_role_accepts_one_match() {
        let caller = Caller::new("author@example.com", [Role::CourseCreator]);
        assert!(caller.require_any_role(AUTHORING_ROLES).is_ok());
        assert!(caller.require_any_role(EVALUATION_ROLES).is_err());
    }

    #[test]
    fn system_manager_is_not_implicitly_moderator() {
        let caller = Caller::new("admin@example.com", [Role::SystemManager]);
        assert!(caller.is_system_manager());
        assert!(caller.require_role(Role::Moderator).is_err());
    }
}
