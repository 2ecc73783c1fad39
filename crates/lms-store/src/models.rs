//! Database models for the storage layer.
//!
//! These types map directly to database rows and are used for sqlx
//! queries. Conversions into the lms-core records live next to each row.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use lms_core::{
    Certificate, CertificateId, CertifiedParticipant, Chapter, ChapterId, CohortId,
    CohortStaffRole, Course, CourseId, Evaluation, EvaluationId, EvaluationStatus, JoinRequest,
    JoinRequestId, Lesson, LessonId, Member, Role, ScormLocation, SubgroupId, UserSummary,
    primary_role,
};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::StoreResult;

/// Database row for the `courses` table.
#[derive(Debug, Clone, FromRow)]
pub struct CourseRow {
    pub id: Uuid,
    pub title: String,
    pub short_introduction: Option<String>,
    pub published: bool,
    pub lessons: i32,
    pub enrollments: i32,
    pub rating: f64,
    pub created: DateTime<Utc>,
}

impl From<CourseRow> for Course {
    fn from(row: CourseRow) -> Self {
        Self {
            id: CourseId::from_uuid(row.id),
            title: row.title,
            short_introduction: row.short_introduction,
            published: row.published,
            lessons: row.lessons,
            enrollments: row.enrollments,
            rating: row.rating,
            created: row.created,
        }
    }
}

/// Database row for the `chapters` table.
#[derive(Debug, Clone, FromRow)]
pub struct ChapterRow {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub is_scorm_package: bool,
    pub scorm_package: Option<String>,
    pub scorm_package_path: Option<String>,
    pub manifest_file: Option<String>,
    pub launch_file: Option<String>,
    pub created: DateTime<Utc>,
}

impl From<ChapterRow> for Chapter {
    fn from(row: ChapterRow) -> Self {
        let scorm = match (
            row.is_scorm_package,
            row.scorm_package_path,
            row.manifest_file,
            row.launch_file,
        ) {
            (true, Some(scorm_package_path), Some(manifest_file), Some(launch_file)) => {
                Some(ScormLocation {
                    scorm_package: row.scorm_package.unwrap_or_default(),
                    scorm_package_path,
                    manifest_file,
                    launch_file,
                })
            }
            _ => None,
        };

        Self {
            id: ChapterId::from_uuid(row.id),
            course: CourseId::from_uuid(row.course_id),
            title: row.title,
            scorm,
            created: row.created,
        }
    }
}

/// Database row for the `lessons` table.
#[derive(Debug, Clone, FromRow)]
pub struct LessonRow {
    pub id: Uuid,
    pub title: String,
    pub chapter_id: Uuid,
    pub course_id: Uuid,
    pub body: Option<String>,
    pub created: DateTime<Utc>,
}

impl From<LessonRow> for Lesson {
    fn from(row: LessonRow) -> Self {
        Self {
            id: LessonId::from_uuid(row.id),
            title: row.title,
            chapter: ChapterId::from_uuid(row.chapter_id),
            course: CourseId::from_uuid(row.course_id),
            body: row.body,
            created: row.created,
        }
    }
}

/// Input for inserting a chapter.
#[derive(Debug, Clone)]
pub struct NewChapter {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub scorm: Option<ScormLocation>,
}

/// Input for inserting a lesson.
#[derive(Debug, Clone)]
pub struct NewLesson {
    pub id: Uuid,
    pub title: String,
    pub chapter_id: Uuid,
    pub course_id: Uuid,
    pub body: Option<String>,
}

/// Database row for the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub email: String,
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub user_image: Option<String>,
    pub enabled: bool,
    pub created: DateTime<Utc>,
}

impl From<UserRow> for UserSummary {
    fn from(row: UserRow) -> Self {
        Self {
            name: row.email,
            full_name: row.full_name,
            user_image: row.user_image,
        }
    }
}

/// An enabled user with the role names held in `user_roles`.
#[derive(Debug, Clone, FromRow)]
pub struct MemberRow {
    pub name: String,
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub user_image: Option<String>,
    pub roles: Vec<String>,
}

impl From<MemberRow> for Member {
    fn from(row: MemberRow) -> Self {
        let roles: Vec<Role> = row.roles.iter().filter_map(|r| r.parse().ok()).collect();
        Self {
            name: row.name,
            full_name: row.full_name,
            username: row.username,
            user_image: row.user_image,
            role: primary_role(&roles),
        }
    }
}

/// Database row for the `cohorts` table.
#[derive(Debug, Clone, FromRow)]
pub struct CohortRow {
    pub id: Uuid,
    pub course_id: Uuid,
    pub slug: String,
    pub title: String,
    pub instructor: String,
    pub created: DateTime<Utc>,
}

/// Database row for the `cohort_staff` table.
#[derive(Debug, Clone, FromRow)]
pub struct CohortStaffRow {
    pub cohort_id: Uuid,
    pub member: String,
    pub role: String,
}

impl CohortStaffRow {
    pub fn role(&self) -> StoreResult<CohortStaffRole> {
        Ok(self.role.parse()?)
    }
}

/// Database row for the `cohort_subgroups` table.
#[derive(Debug, Clone, FromRow)]
pub struct SubgroupRow {
    pub id: Uuid,
    pub cohort_id: Uuid,
    pub slug: String,
    pub title: String,
    pub invite_code: String,
    pub created: DateTime<Utc>,
}

/// Database row for the `cohort_join_requests` table.
#[derive(Debug, Clone, FromRow)]
pub struct JoinRequestRow {
    pub id: Uuid,
    pub cohort_id: Uuid,
    pub subgroup_id: Uuid,
    pub email: String,
    pub status: String,
    pub created: DateTime<Utc>,
}

impl TryFrom<JoinRequestRow> for JoinRequest {
    type Error = crate::error::StoreError;

    fn try_from(row: JoinRequestRow) -> StoreResult<Self> {
        Ok(Self {
            id: JoinRequestId::from_uuid(row.id),
            cohort: CohortId::from_uuid(row.cohort_id),
            subgroup: SubgroupId::from_uuid(row.subgroup_id),
            email: row.email,
            status: row.status.parse()?,
            created: row.created,
        })
    }
}

/// Database row for `certificates`, joined with the course title.
#[derive(Debug, Clone, FromRow)]
pub struct CertificateRow {
    pub id: Uuid,
    pub member: String,
    pub course_id: Uuid,
    pub course_title: Option<String>,
    pub evaluator: Option<String>,
    pub batch_name: Option<String>,
    pub issue_date: NaiveDate,
    pub expiry_date: Option<NaiveDate>,
    pub template: Option<String>,
    pub published: bool,
}

impl From<CertificateRow> for Certificate {
    fn from(row: CertificateRow) -> Self {
        Self {
            id: CertificateId::from_uuid(row.id),
            member: row.member,
            course: CourseId::from_uuid(row.course_id),
            course_title: row.course_title,
            evaluator: row.evaluator,
            batch_name: row.batch_name,
            issue_date: row.issue_date,
            expiry_date: row.expiry_date,
            template: row.template,
            published: row.published,
        }
    }
}

/// Input for the certificate upsert.
#[derive(Debug, Clone)]
pub struct CertificateDetails {
    pub member: String,
    pub course_id: Uuid,
    pub evaluator: Option<String>,
    pub batch_name: Option<String>,
    pub issue_date: NaiveDate,
    pub expiry_date: Option<NaiveDate>,
    pub template: Option<String>,
    pub published: bool,
}

/// Database row for the `certificate_evaluations` table.
#[derive(Debug, Clone, FromRow)]
pub struct EvaluationRow {
    pub id: Uuid,
    pub member: String,
    pub course_id: Uuid,
    pub evaluator: Option<String>,
    pub batch_name: Option<String>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: String,
    pub rating: f64,
    pub summary: Option<String>,
}

impl TryFrom<EvaluationRow> for Evaluation {
    type Error = crate::error::StoreError;

    fn try_from(row: EvaluationRow) -> StoreResult<Self> {
        Ok(Self {
            id: EvaluationId::from_uuid(row.id),
            member: row.member,
            course: CourseId::from_uuid(row.course_id),
            evaluator: row.evaluator,
            batch_name: row.batch_name,
            date: row.date,
            start_time: row.start_time,
            end_time: row.end_time,
            status: row.status.parse::<EvaluationStatus>()?,
            rating: row.rating,
            summary: row.summary,
        })
    }
}

/// Input for the evaluation upsert. `rating` is already on the 0–1 scale.
#[derive(Debug, Clone)]
pub struct EvaluationDetails {
    pub member: String,
    pub course_id: Uuid,
    pub evaluator: Option<String>,
    pub batch_name: Option<String>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: EvaluationStatus,
    pub rating: f64,
    pub summary: Option<String>,
}

/// One certified member with the titles of their certified courses.
#[derive(Debug, Clone, FromRow)]
pub struct CertifiedParticipantRow {
    pub name: String,
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub user_image: Option<String>,
    pub courses: Vec<String>,
}

impl From<CertifiedParticipantRow> for CertifiedParticipant {
    fn from(row: CertifiedParticipantRow) -> Self {
        Self {
            name: row.name,
            full_name: row.full_name,
            username: row.username,
            user_image: row.user_image,
            courses: row.courses,
        }
    }
}
