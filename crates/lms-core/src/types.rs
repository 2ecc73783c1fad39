//! Core data types for the LMS backend.
//!
//! This module defines the records shared by the store, the SCORM importer
//! and the HTTP layer:
//!
//! - Typed identifiers for every record kind
//! - Courses, chapters (optionally backed by a SCORM package) and lessons
//! - Lesson references, the ordering rows that place a lesson in a chapter
//! - Cohort join requests, certificates and certificate evaluations
//! - Member profiles and the member directory
//!
//! All types derive `Debug`, `Clone`, `Serialize`, and `Deserialize` for
//! inspection, copying, and JSON serialization.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::caller::Role;

// ============================================================================
// ID Types
// ============================================================================

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random identifier using UUID v4.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a course.
    CourseId
);
uuid_id!(
    /// Unique identifier for a course chapter.
    ChapterId
);
uuid_id!(
    /// Unique identifier for a lesson.
    LessonId
);
uuid_id!(
    /// Unique identifier for a cohort of a course.
    CohortId
);
uuid_id!(
    /// Unique identifier for a subgroup within a cohort.
    SubgroupId
);
uuid_id!(
    /// Unique identifier for a cohort join request.
    JoinRequestId
);
uuid_id!(
    /// Unique identifier for an issued certificate.
    CertificateId
);
uuid_id!(
    /// Unique identifier for a certificate evaluation.
    EvaluationId
);

// ============================================================================
// Course Structure
// ============================================================================

/// A course: the top-level container for chapters and lessons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub short_introduction: Option<String>,
    pub published: bool,
    /// Lesson count as of the last statistics refresh.
    pub lessons: i32,
    /// Enrollment count as of the last statistics refresh.
    pub enrollments: i32,
    /// Average review rating on the 0-1 scale.
    pub rating: f64,
    pub created: DateTime<Utc>,
}

/// Where an extracted SCORM package lives, relative to the public asset root.
///
/// Every path starts with `/` and can be served directly by the asset server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScormLocation {
    /// URL of the uploaded archive the package was extracted from.
    pub scorm_package: String,
    /// Directory the archive was extracted into.
    pub scorm_package_path: String,
    /// Path of `imsmanifest.xml`.
    pub manifest_file: String,
    /// Entry-point document referenced by the manifest's `sco` resource.
    pub launch_file: String,
}

/// A chapter of a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: ChapterId,
    pub course: CourseId,
    pub title: String,
    /// Present when the chapter is backed by a SCORM package.
    pub scorm: Option<ScormLocation>,
    pub created: DateTime<Utc>,
}

impl Chapter {
    /// Whether this chapter delivers its content from a SCORM package.
    #[must_use]
    pub fn is_scorm_package(&self) -> bool {
        self.scorm.is_some()
    }
}

/// A lesson. Its position inside a chapter is held by a [`LessonReference`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: LessonId,
    pub title: String,
    pub chapter: ChapterId,
    pub course: CourseId,
    pub body: Option<String>,
    pub created: DateTime<Utc>,
}

/// Ordering row placing a lesson inside a chapter.
///
/// `idx` is 1-based and dense within the parent chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonReference {
    pub lesson: LessonId,
    pub chapter: ChapterId,
    pub idx: i32,
}

/// A chapter together with its lessons in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterOutline {
    pub chapter: Chapter,
    pub lessons: Vec<Lesson>,
}

/// A course together with its chapters in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseOutline {
    pub course: Course,
    pub chapters: Vec<ChapterOutline>,
}

// ============================================================================
// Cohorts
// ============================================================================

/// Lifecycle of a cohort join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinRequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl JoinRequestStatus {
    /// The persisted representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Accepted => "Accepted",
            Self::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for JoinRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JoinRequestStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Accepted" => Ok(Self::Accepted),
            "Rejected" => Ok(Self::Rejected),
            other => Err(UnknownVariant::new("join request status", other)),
        }
    }
}

/// Staff role a member can hold on a cohort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CohortStaffRole {
    Admin,
    Manager,
}

impl CohortStaffRole {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Manager => "Manager",
        }
    }
}

impl FromStr for CohortStaffRole {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Self::Admin),
            "Manager" => Ok(Self::Manager),
            other => Err(UnknownVariant::new("cohort staff role", other)),
        }
    }
}

/// A request by a user to join a cohort subgroup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRequest {
    pub id: JoinRequestId,
    pub cohort: CohortId,
    pub subgroup: SubgroupId,
    pub email: String,
    pub status: JoinRequestStatus,
    pub created: DateTime<Utc>,
}

/// A manager's decision on a join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JoinDecision {
    Approve,
    Reject,
    UndoReject,
}

impl JoinDecision {
    /// Status the request ends up in.
    #[must_use]
    pub const fn target(&self) -> JoinRequestStatus {
        match self {
            Self::Approve => JoinRequestStatus::Accepted,
            Self::Reject => JoinRequestStatus::Rejected,
            Self::UndoReject => JoinRequestStatus::Pending,
        }
    }

    /// Whether the decision may be applied to a request in `status`.
    ///
    /// Applying a decision twice is allowed. Undo keeps `Pending` so that a
    /// duplicate request can be undone too.
    #[must_use]
    pub const fn applies_to(&self, status: JoinRequestStatus) -> bool {
        matches!(
            (self, status),
            (Self::Approve, JoinRequestStatus::Pending | JoinRequestStatus::Accepted)
                | (
                    Self::Reject | Self::UndoReject,
                    JoinRequestStatus::Pending | JoinRequestStatus::Rejected
                )
        )
    }
}

// ============================================================================
// Certification
// ============================================================================

/// Outcome of a certificate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvaluationStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Pass,
    Fail,
}

impl EvaluationStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Pass => "Pass",
            Self::Fail => "Fail",
        }
    }
}

impl FromStr for EvaluationStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "In Progress" => Ok(Self::InProgress),
            "Pass" => Ok(Self::Pass),
            "Fail" => Ok(Self::Fail),
            other => Err(UnknownVariant::new("evaluation status", other)),
        }
    }
}

/// A certificate issued to a member for a course. One per (member, course).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    pub id: CertificateId,
    pub member: String,
    pub course: CourseId,
    pub course_title: Option<String>,
    pub evaluator: Option<String>,
    pub batch_name: Option<String>,
    pub issue_date: NaiveDate,
    pub expiry_date: Option<NaiveDate>,
    pub template: Option<String>,
    pub published: bool,
}

/// Evaluation of a member against a course. One per (member, course).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: EvaluationId,
    pub member: String,
    pub course: CourseId,
    pub evaluator: Option<String>,
    pub batch_name: Option<String>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: EvaluationStatus,
    /// Normalised to the 0.0..=1.0 range.
    pub rating: f64,
    pub summary: Option<String>,
}

/// Highest value accepted for an evaluation rating before normalisation.
pub const MAX_RATING: f64 = 5.0;

/// Convert a 0–5 star rating into the stored 0–1 fraction.
///
/// Returns `None` when the rating is outside 0–5 or not finite.
#[must_use]
pub fn normalize_rating(stars: f64) -> Option<f64> {
    if stars.is_finite() && (0.0..=MAX_RATING).contains(&stars) {
        Some(stars / MAX_RATING)
    } else {
        None
    }
}

/// A course review left by an enrolled member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewInput {
    pub course: CourseId,
    /// Stars from 0 to 5.
    pub rating: f64,
    pub review: Option<String>,
}

// ============================================================================
// Members
// ============================================================================

/// A user profile together with the site-wide roles it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub user_image: Option<String>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub roles: Vec<Role>,
}

fn enabled_by_default() -> bool {
    true
}

/// One row of the member directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub user_image: Option<String>,
    pub role: Option<Role>,
}

/// The fields shown next to a user's name across the site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub name: String,
    pub full_name: Option<String>,
    pub user_image: Option<String>,
}

/// Default page size of the member directory.
pub const MEMBERS_PAGE_LENGTH: i64 = 20;

/// A member with at least one published certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertifiedParticipant {
    pub name: String,
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub user_image: Option<String>,
    /// Titles of the courses the member is certified for.
    pub courses: Vec<String>,
}

// ============================================================================
// Bulk operations
// ============================================================================

/// Record kinds that can be removed through the bulk delete procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    #[serde(rename = "LMS Course")]
    Course,
    #[serde(rename = "Course Chapter")]
    Chapter,
    #[serde(rename = "Course Lesson")]
    Lesson,
    #[serde(rename = "LMS Certificate")]
    Certificate,
    #[serde(rename = "LMS Certificate Evaluation")]
    Evaluation,
    #[serde(rename = "Cohort Join Request")]
    JoinRequest,
}

impl DocumentKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Course => "LMS Course",
            Self::Chapter => "Course Chapter",
            Self::Lesson => "Course Lesson",
            Self::Certificate => "LMS Certificate",
            Self::Evaluation => "LMS Certificate Evaluation",
            Self::JoinRequest => "Cohort Join Request",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LMS Course" => Ok(Self::Course),
            "Course Chapter" => Ok(Self::Chapter),
            "Course Lesson" => Ok(Self::Lesson),
            "LMS Certificate" => Ok(Self::Certificate),
            "LMS Certificate Evaluation" => Ok(Self::Evaluation),
            "Cohort Join Request" => Ok(Self::JoinRequest),
            other => Err(UnknownVariant::new("document kind", other)),
        }
    }
}

// ============================================================================
// Parse errors
// ============================================================================

/// A persisted or client-supplied string did not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
