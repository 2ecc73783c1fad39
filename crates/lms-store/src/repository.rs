//! Repository layer providing caller-checked, domain-typed operations.
//!
//! Every method takes the explicit [`Caller`] and checks its roles before
//! touching the store. SCORM extraction and package removal run on the
//! blocking thread pool.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use lms_core::{
    AUTHORING_ROLES, Caller, Certificate, CertificateId, CertifiedParticipant, Chapter, ChapterId,
    ChapterOutline, Course, CourseId, CourseOutline, DocumentKind, EVALUATION_ROLES,
    EvaluationId, EvaluationStatus, JoinDecision, JoinRequest, JoinRequestId, Lesson, LessonId,
    LessonMove, MEMBERS_PAGE_LENGTH, Member, ReorderPlan, ReviewInput, Role, ScormLocation,
    SubgroupId, UserProfile, UserSummary, normalize_rating, require_non_empty,
};
use lms_scorm::ScormImporter;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Store;
use crate::error::{StoreError, StoreResult};
use crate::models::{CertificateDetails, EvaluationDetails, NewChapter, NewLesson};

/// Roles allowed to manage user profiles and site-wide maintenance jobs.
pub const USER_ADMIN_ROLES: &[Role] = &[Role::SystemManager, Role::Moderator];

/// Input for creating a course.
#[derive(Debug, Clone, Deserialize)]
pub struct CourseInput {
    pub title: String,
    #[serde(default)]
    pub short_introduction: Option<String>,
    #[serde(default)]
    pub published: bool,
}

/// Input for creating or updating a chapter.
///
/// With `id` set the chapter is updated, otherwise created. `scorm_package`
/// is the file URL of an uploaded archive; when present the chapter becomes
/// SCORM-backed.
#[derive(Debug, Clone, Deserialize)]
pub struct ChapterInput {
    #[serde(default)]
    pub id: Option<ChapterId>,
    pub course: CourseId,
    pub title: String,
    #[serde(default)]
    pub scorm_package: Option<String>,
}

/// Input for creating a lesson.
#[derive(Debug, Clone, Deserialize)]
pub struct LessonInput {
    pub chapter: ChapterId,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
}

/// Input for saving an evaluation. `rating` is in stars, 0 to 5.
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationInput {
    pub member: String,
    pub course: CourseId,
    #[serde(default)]
    pub batch_name: Option<String>,
    #[serde(default)]
    pub evaluator: Option<String>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: EvaluationStatus,
    pub rating: f64,
    #[serde(default)]
    pub summary: Option<String>,
}

/// Input for saving a certificate.
#[derive(Debug, Clone, Deserialize)]
pub struct CertificateInput {
    pub member: String,
    pub course: CourseId,
    #[serde(default)]
    pub batch_name: Option<String>,
    #[serde(default)]
    pub evaluator: Option<String>,
    pub issue_date: NaiveDate,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default = "default_published")]
    pub published: bool,
}

fn default_published() -> bool {
    true
}

/// Result of a join attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "request")]
pub enum JoinOutcome {
    #[serde(rename = "record created")]
    Created(JoinRequest),
    #[serde(rename = "record found")]
    Existing(JoinRequest),
}

impl JoinOutcome {
    pub fn request(&self) -> &JoinRequest {
        match self {
            Self::Created(request) | Self::Existing(request) => request,
        }
    }
}

/// Repository providing caller-checked access to the store.
#[derive(Debug, Clone)]
pub struct Repository {
    store: Store,
    importer: ScormImporter,
}

impl Repository {
    /// Create a new repository over the store and the SCORM importer.
    pub fn new(store: Store, importer: ScormImporter) -> Self {
        Self { store, importer }
    }

    /// Get reference to the underlying store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn importer(&self) -> &ScormImporter {
        &self.importer
    }

    // ========================================================================
    // Members
    // ========================================================================

    /// Create or update a user profile with its site-wide roles.
    pub async fn save_user(&self, caller: &Caller, profile: &UserProfile) -> StoreResult<()> {
        caller.require_any_role(USER_ADMIN_ROLES)?;
        require_non_empty("email", &profile.email)?;

        let row = self.store.save_user(profile).await?;
        tracing::info!(member = %row.email, roles = profile.roles.len(), user = %caller.user, "User saved");
        Ok(())
    }

    /// One page of the member directory, starting at offset `start`.
    pub async fn members(&self, search: Option<&str>, start: i64) -> StoreResult<Vec<Member>> {
        let rows = self
            .store
            .list_members(search, start, MEMBERS_PAGE_LENGTH)
            .await?;
        Ok(rows.into_iter().map(Member::from).collect())
    }

    /// Every enabled user, keyed by email.
    pub async fn all_users(&self) -> StoreResult<BTreeMap<String, UserSummary>> {
        let rows = self.store.enabled_users().await?;
        Ok(rows
            .into_iter()
            .map(|row| (row.email.clone(), UserSummary::from(row)))
            .collect())
    }

    // ========================================================================
    // Courses
    // ========================================================================

    pub async fn create_course(&self, caller: &Caller, input: &CourseInput) -> StoreResult<Course> {
        caller.require_any_role(AUTHORING_ROLES)?;
        require_non_empty("title", &input.title)?;

        let row = self
            .store
            .insert_course(
                Uuid::new_v4(),
                input.title.trim(),
                input.short_introduction.as_deref(),
                input.published,
            )
            .await?;

        tracing::info!(course = %row.id, user = %caller.user, "Course created");
        Ok(row.into())
    }

    /// A course with its chapters and lessons in display order.
    pub async fn course_outline(&self, course: CourseId) -> StoreResult<CourseOutline> {
        let course_row = self.store.get_course(course.0).await?;
        let chapters = self.store.list_chapters(course.0).await?;

        let mut outline = Vec::with_capacity(chapters.len());
        for chapter in chapters {
            let lessons = self
                .store
                .list_lessons(chapter.id)
                .await?
                .into_iter()
                .map(Lesson::from)
                .collect();
            outline.push(ChapterOutline {
                chapter: chapter.into(),
                lessons,
            });
        }

        Ok(CourseOutline {
            course: course_row.into(),
            chapters: outline,
        })
    }

    /// Delete a course with its chapters, lessons and extracted packages.
    pub async fn delete_course(&self, caller: &Caller, course: CourseId) -> StoreResult<()> {
        caller.require_any_role(AUTHORING_ROLES)?;

        let packages = self.store.delete_course(course.0).await?;
        for path in packages {
            self.remove_package(path).await;
        }

        tracing::info!(course = %course, user = %caller.user, "Course deleted");
        Ok(())
    }

    /// Refresh the cached lesson count, enrollment count and rating of
    /// every course. Returns the number of courses updated.
    pub async fn update_course_statistics(&self, caller: &Caller) -> StoreResult<u64> {
        caller.require_any_role(USER_ADMIN_ROLES)?;

        let updated = self.store.update_course_statistics().await?;
        tracing::info!(courses = updated, user = %caller.user, "Course statistics updated");
        Ok(updated)
    }

    /// Save the caller's review of a course they are enrolled in.
    pub async fn save_review(&self, caller: &Caller, input: &ReviewInput) -> StoreResult<Uuid> {
        let rating = normalize_rating(input.rating).ok_or_else(|| {
            StoreError::Validation(format!("rating {} is outside 0 to 5", input.rating))
        })?;
        if !self.store.is_enrolled(input.course.0, &caller.user).await? {
            return Err(StoreError::Validation(format!(
                "{} is not enrolled in course {}",
                caller.user, input.course
            )));
        }

        let saved = self
            .store
            .upsert_review(
                input.course.0,
                &caller.user,
                rating,
                input.review.as_deref().map(str::trim).filter(|r| !r.is_empty()),
            )
            .await?;

        tracing::info!(course = %input.course, user = %caller.user, created = saved.created, "Review saved");
        Ok(saved.id)
    }

    // ========================================================================
    // Chapters
    // ========================================================================

    /// Create or update a chapter, importing its SCORM package if given.
    ///
    /// A SCORM chapter without lessons gets one lesson named after the
    /// chapter. When an update moves or drops the package, the old
    /// extraction directory is removed.
    pub async fn upsert_chapter(&self, caller: &Caller, input: &ChapterInput) -> StoreResult<Chapter> {
        caller.require_any_role(AUTHORING_ROLES)?;
        require_non_empty("title", &input.title)?;
        let title = input.title.trim().to_string();

        let existing = match input.id {
            Some(id) => {
                let row = self.store.get_chapter(id.0).await?;
                if row.course_id != input.course.0 {
                    return Err(StoreError::Validation(format!(
                        "chapter {} belongs to another course",
                        id
                    )));
                }
                Some(Chapter::from(row))
            }
            None => {
                self.store.get_course(input.course.0).await?;
                None
            }
        };

        let scorm = match &input.scorm_package {
            Some(upload) => {
                self.ensure_package_dir_free(input.course, &title, input.id)
                    .await?;
                Some(self.import_package(input.course, &title, upload).await?)
            }
            None => None,
        };

        let saved = match &existing {
            Some(chapter) => {
                self.store
                    .update_chapter(chapter.id.0, &title, scorm.as_ref())
                    .await
            }
            None => {
                self.store
                    .insert_chapter(&NewChapter {
                        id: Uuid::new_v4(),
                        course_id: input.course.0,
                        title: title.clone(),
                        scorm: scorm.clone(),
                    })
                    .await
            }
        };

        let row = match saved {
            Ok(row) => row,
            Err(e) => {
                let replaced_own_package = existing
                    .as_ref()
                    .and_then(|c| c.scorm.as_ref())
                    .zip(scorm.as_ref())
                    .is_some_and(|(old, new)| old.scorm_package_path == new.scorm_package_path);
                // A unique violation means another chapter owns the directory.
                if let Some(new) = &scorm
                    && !replaced_own_package
                    && !e.is_unique_violation()
                {
                    self.remove_package(new.scorm_package_path.clone()).await;
                }
                return Err(e);
            }
        };

        if let Some(old) = existing.as_ref().and_then(|c| c.scorm.as_ref()) {
            let still_used = scorm
                .as_ref()
                .is_some_and(|new| new.scorm_package_path == old.scorm_package_path);
            if !still_used {
                self.remove_package(old.scorm_package_path.clone()).await;
            }
        }

        if scorm.is_some() && self.store.lesson_count(row.id).await? == 0 {
            self.store
                .insert_lesson(&NewLesson {
                    id: Uuid::new_v4(),
                    title: title.clone(),
                    chapter_id: row.id,
                    course_id: row.course_id,
                    body: None,
                })
                .await?;
        }

        tracing::info!(
            chapter = %row.id,
            course = %row.course_id,
            scorm = scorm.is_some(),
            created = existing.is_none(),
            "Chapter saved"
        );
        Ok(row.into())
    }

    /// Delete a chapter, its lessons and its extracted package.
    pub async fn delete_chapter(&self, caller: &Caller, chapter: ChapterId) -> StoreResult<()> {
        caller.require_any_role(AUTHORING_ROLES)?;

        let row = self.store.delete_chapter(chapter.0).await?;
        if row.is_scorm_package
            && let Some(path) = row.scorm_package_path
        {
            self.remove_package(path).await;
        }

        tracing::info!(chapter = %chapter, user = %caller.user, "Chapter deleted");
        Ok(())
    }

    /// Packages are extracted per (course, title), so two SCORM chapters of a
    /// course cannot share a title.
    async fn ensure_package_dir_free(
        &self,
        course: CourseId,
        title: &str,
        chapter: Option<ChapterId>,
    ) -> StoreResult<()> {
        let dir = self.importer.extraction_dir(course, title);
        let path = self.importer.assets().to_relative(&dir)?;
        let owner = self
            .store
            .chapter_using_package(&path, chapter.map(|c| c.0))
            .await?;
        match owner {
            Some(other) => Err(StoreError::Validation(format!(
                "chapter {} already holds a SCORM package titled {:?} in this course",
                other, title
            ))),
            None => Ok(()),
        }
    }

    async fn import_package(
        &self,
        course: CourseId,
        title: &str,
        upload: &str,
    ) -> StoreResult<ScormLocation> {
        let importer = self.importer.clone();
        let title = title.to_string();
        let upload = upload.to_string();

        let location =
            tokio::task::spawn_blocking(move || importer.import_upload(course, &title, &upload))
                .await??;
        Ok(location)
    }

    /// Remove an extracted package. Failures are logged, not returned.
    async fn remove_package(&self, path: String) {
        let importer = self.importer.clone();
        let result =
            tokio::task::spawn_blocking(move || importer.remove_package(&path).map(|_| path)).await;

        match result {
            Ok(Ok(path)) => tracing::debug!(path = %path, "Package directory cleared"),
            Ok(Err(e)) => tracing::warn!(error = %e, "Failed to remove SCORM package"),
            Err(e) => tracing::warn!(error = %e, "SCORM removal task failed"),
        }
    }

    // ========================================================================
    // Lessons
    // ========================================================================

    /// Create a lesson at the end of a chapter.
    pub async fn create_lesson(&self, caller: &Caller, input: &LessonInput) -> StoreResult<Lesson> {
        caller.require_any_role(AUTHORING_ROLES)?;
        require_non_empty("title", &input.title)?;

        let chapter = self.store.get_chapter(input.chapter.0).await?;
        let row = self
            .store
            .insert_lesson(&NewLesson {
                id: Uuid::new_v4(),
                title: input.title.trim().to_string(),
                chapter_id: chapter.id,
                course_id: chapter.course_id,
                body: input.body.clone(),
            })
            .await?;

        tracing::info!(lesson = %row.id, chapter = %row.chapter_id, "Lesson created");
        Ok(row.into())
    }

    /// Delete a lesson from a chapter along with its progress rows.
    pub async fn delete_lesson(
        &self,
        caller: &Caller,
        lesson: LessonId,
        chapter: ChapterId,
    ) -> StoreResult<()> {
        caller.require_any_role(AUTHORING_ROLES)?;

        self.store.delete_lesson(lesson.0, chapter.0).await?;

        tracing::info!(lesson = %lesson, chapter = %chapter, "Lesson deleted");
        Ok(())
    }

    /// Move a lesson within or across chapters.
    pub async fn reorder_lesson(&self, caller: &Caller, mv: &LessonMove) -> StoreResult<ReorderPlan> {
        caller.require_any_role(AUTHORING_ROLES)?;

        let plan = self.store.move_lesson(mv).await?;

        tracing::info!(
            lesson = %mv.lesson,
            source = %mv.source,
            target = %mv.target,
            index = mv.index,
            "Lesson reordered"
        );
        Ok(plan)
    }

    /// Record the caller's current lesson. Returns false when the caller is
    /// not enrolled in the course.
    pub async fn save_current_lesson(
        &self,
        caller: &Caller,
        course: CourseId,
        lesson: LessonId,
    ) -> StoreResult<bool> {
        let updated = self
            .store
            .set_current_lesson(course.0, &caller.user, lesson.0)
            .await?;
        if !updated {
            tracing::debug!(course = %course, user = %caller.user, "Not enrolled, current lesson not saved");
        }
        Ok(updated)
    }

    // ========================================================================
    // Cohorts
    // ========================================================================

    /// Ask to join a cohort subgroup through its invite link.
    pub async fn join_cohort(
        &self,
        caller: &Caller,
        course: CourseId,
        cohort: &str,
        subgroup: &str,
        invite_code: &str,
    ) -> StoreResult<JoinOutcome> {
        let subgroup_row = self
            .store
            .find_subgroup(course.0, cohort, subgroup)
            .await?
            .filter(|s| s.invite_code == invite_code)
            .ok_or_else(|| StoreError::InvalidState("Invalid join link".to_string()))?;

        if let Some(existing) = self
            .store
            .find_pending_join_request(subgroup_row.cohort_id, subgroup_row.id, &caller.user)
            .await?
        {
            return Ok(JoinOutcome::Existing(existing.try_into()?));
        }

        let row = self
            .store
            .insert_join_request(subgroup_row.cohort_id, subgroup_row.id, &caller.user)
            .await?;

        tracing::info!(request = %row.id, subgroup = %row.subgroup_id, user = %caller.user, "Join request created");
        Ok(JoinOutcome::Created(row.try_into()?))
    }

    /// Approve, reject or undo the rejection of a join request.
    ///
    /// Allowed for mentors of the request's subgroup, admins of its cohort and
    /// system managers.
    pub async fn decide_join_request(
        &self,
        caller: &Caller,
        request: JoinRequestId,
        decision: JoinDecision,
    ) -> StoreResult<JoinRequest> {
        let row = self.store.get_join_request(request.0).await?;
        let current: JoinRequest = row.try_into()?;

        if !decision.applies_to(current.status) {
            return Err(StoreError::InvalidState("Invalid Join Request".to_string()));
        }
        if !self.manages_subgroup(caller, current.subgroup).await? {
            return Err(StoreError::PermissionDenied(format!(
                "{} does not manage subgroup {}",
                caller.user, current.subgroup
            )));
        }

        let updated = self
            .store
            .set_join_request_status(request.0, decision.target())
            .await?;

        tracing::info!(request = %request, status = %decision.target(), user = %caller.user, "Join request updated");
        updated.try_into()
    }

    /// Add a mentor to a subgroup. Allowed for cohort admins and system
    /// managers.
    pub async fn add_mentor(
        &self,
        caller: &Caller,
        subgroup: SubgroupId,
        email: &str,
    ) -> StoreResult<bool> {
        let subgroup_row = self.store.get_subgroup(subgroup.0).await?;

        if !caller.is_system_manager()
            && !self
                .store
                .is_cohort_admin(subgroup_row.cohort_id, &caller.user)
                .await?
        {
            return Err(StoreError::PermissionDenied(format!(
                "{} is not an admin of cohort {}",
                caller.user, subgroup_row.cohort_id
            )));
        }

        if !self.store.user_exists(email).await? {
            return Err(StoreError::not_found("user", email));
        }

        let added = self.store.add_mentor(subgroup.0, email).await?;
        tracing::info!(subgroup = %subgroup, mentor = %email, added, "Mentor added");
        Ok(added)
    }

    async fn manages_subgroup(&self, caller: &Caller, subgroup: SubgroupId) -> StoreResult<bool> {
        if caller.is_system_manager() {
            return Ok(true);
        }
        let subgroup_row = self.store.get_subgroup(subgroup.0).await?;
        if self
            .store
            .is_cohort_admin(subgroup_row.cohort_id, &caller.user)
            .await?
        {
            return Ok(true);
        }
        self.store.is_subgroup_mentor(subgroup.0, &caller.user).await
    }

    // ========================================================================
    // Certification
    // ========================================================================

    /// Create or update the evaluation of a member for a course.
    pub async fn save_evaluation(
        &self,
        caller: &Caller,
        input: &EvaluationInput,
    ) -> StoreResult<EvaluationId> {
        caller.require_any_role(EVALUATION_ROLES)?;
        require_non_empty("member", &input.member)?;
        let rating = normalize_rating(input.rating).ok_or_else(|| {
            StoreError::Validation(format!("rating {} is outside 0 to 5", input.rating))
        })?;
        if input.end_time < input.start_time {
            return Err(StoreError::Validation(
                "end_time is before start_time".to_string(),
            ));
        }

        let saved = self
            .store
            .upsert_evaluation(&EvaluationDetails {
                member: input.member.clone(),
                course_id: input.course.0,
                evaluator: input.evaluator.clone(),
                batch_name: input.batch_name.clone(),
                date: input.date,
                start_time: input.start_time,
                end_time: input.end_time,
                status: input.status,
                rating,
                summary: input.summary.clone(),
            })
            .await?;

        tracing::info!(evaluation = %saved.id, member = %input.member, created = saved.created, "Evaluation saved");
        Ok(EvaluationId::from_uuid(saved.id))
    }

    /// Create or update the certificate of a member for a course.
    pub async fn save_certificate(
        &self,
        caller: &Caller,
        input: &CertificateInput,
    ) -> StoreResult<CertificateId> {
        caller.require_any_role(EVALUATION_ROLES)?;
        require_non_empty("member", &input.member)?;
        if input.expiry_date.is_some_and(|expiry| expiry < input.issue_date) {
            return Err(StoreError::Validation(
                "expiry_date is before issue_date".to_string(),
            ));
        }

        let saved = self
            .store
            .upsert_certificate(&CertificateDetails {
                member: input.member.clone(),
                course_id: input.course.0,
                evaluator: input.evaluator.clone(),
                batch_name: input.batch_name.clone(),
                issue_date: input.issue_date,
                expiry_date: input.expiry_date,
                template: input.template.clone(),
                published: input.published,
            })
            .await?;

        tracing::info!(certificate = %saved.id, member = %input.member, created = saved.created, "Certificate saved");
        Ok(CertificateId::from_uuid(saved.id))
    }

    /// Certificates of a member, newest first.
    pub async fn certificates(&self, member: &str) -> StoreResult<Vec<Certificate>> {
        Ok(self
            .store
            .certificates_for_member(member)
            .await?
            .into_iter()
            .map(Certificate::from)
            .collect())
    }

    /// Members holding a published certificate.
    pub async fn certified_participants(&self) -> StoreResult<Vec<CertifiedParticipant>> {
        Ok(self
            .store
            .certified_participants()
            .await?
            .into_iter()
            .map(CertifiedParticipant::from)
            .collect())
    }

    // ========================================================================
    // Bulk operations
    // ========================================================================

    /// Delete records of one kind. Moderators only.
    ///
    /// Ids are validated up front; deletion stops at the first record that
    /// does not exist. Returns the number of records deleted.
    pub async fn delete_documents(
        &self,
        caller: &Caller,
        kind: DocumentKind,
        ids: &[String],
    ) -> StoreResult<usize> {
        caller.require_role(Role::Moderator)?;

        let ids = ids
            .iter()
            .map(|id| {
                id.parse::<Uuid>()
                    .map_err(|_| StoreError::Validation(format!("invalid {} id: {}", kind, id)))
            })
            .collect::<StoreResult<Vec<_>>>()?;

        let mut deleted = 0;
        for id in ids {
            match kind {
                DocumentKind::Course => self.delete_course(caller, CourseId::from_uuid(id)).await?,
                DocumentKind::Chapter => {
                    self.delete_chapter(caller, ChapterId::from_uuid(id)).await?
                }
                DocumentKind::Lesson => {
                    let lesson = self.store.get_lesson(id).await?;
                    self.delete_lesson(
                        caller,
                        LessonId::from_uuid(id),
                        ChapterId::from_uuid(lesson.chapter_id),
                    )
                    .await?
                }
                DocumentKind::Certificate => {
                    if !self.store.delete_certificate(id).await? {
                        return Err(StoreError::not_found("certificate", id));
                    }
                }
                DocumentKind::Evaluation => {
                    if !self.store.delete_evaluation(id).await? {
                        return Err(StoreError::not_found("evaluation", id));
                    }
                }
                DocumentKind::JoinRequest => {
                    if !self.store.delete_join_request(id).await? {
                        return Err(StoreError::not_found("join request", id));
                    }
                }
            }
            deleted += 1;
        }

        tracing::info!(kind = %kind, deleted, user = %caller.user, "Documents deleted");
        Ok(deleted)
    }
}


/// Integration tests that require a running PostgreSQL database.
/// Run with: cargo test --features integration-tests
#[cfg(all(test, feature = "integration-tests"))]
mod integration_tests {
    use super::*;
    use crate::StoreConfig;
    use lms_core::JoinRequestStatus;
    use lms_scorm::AssetRoot;
    use sqlx::postgres::PgPoolOptions;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    const MANIFEST: &str = r#"<manifest><resources>
        <resource identifier="r" adlcp:scormtype="sco" href="index.html"/>
    </resources></manifest>"#;

    struct Fixture {
        repo: Repository,
        _assets: tempfile::TempDir,
    }

    async fn setup() -> Fixture {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| StoreConfig::default().database_url);
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await
            .expect("Failed to connect to database");
        crate::schema::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let assets = tempfile::tempdir().unwrap();
        let importer = ScormImporter::new(AssetRoot::new(
            assets.path().join("public"),
            assets.path().join("private"),
        ));
        Fixture {
            repo: Repository::new(Store::from_pool(pool), importer),
            _assets: assets,
        }
    }

    fn author() -> Caller {
        Caller::new("author@example.com", [Role::CourseCreator])
    }

    fn upload_package(repo: &Repository) -> String {
        let mut buf = std::io::Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut buf);
            zip.start_file("imsmanifest.xml", SimpleFileOptions::default()).unwrap();
            zip.write_all(MANIFEST.as_bytes()).unwrap();
            zip.start_file("index.html", SimpleFileOptions::default()).unwrap();
            zip.write_all(b"<html></html>").unwrap();
            zip.finish().unwrap();
        }
        repo.importer()
            .assets()
            .store_upload("package.zip", buf.get_ref(), false)
            .unwrap()
    }

    async fn course(repo: &Repository) -> CourseId {
        repo.create_course(
            &author(),
            &CourseInput {
                title: "SCORM course".to_string(),
                short_introduction: None,
                published: true,
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_scorm_chapter_lifecycle() {
        let fx = setup().await;
        let repo = &fx.repo;
        let course = course(repo).await;
        let upload = upload_package(repo);

        let chapter = repo
            .upsert_chapter(
                &author(),
                &ChapterInput {
                    id: None,
                    course,
                    title: "Unit 1".to_string(),
                    scorm_package: Some(upload.clone()),
                },
            )
            .await
            .unwrap();

        let scorm = chapter.scorm.clone().expect("chapter should be SCORM-backed");
        let launch = repo.importer().assets().resolve_public(&scorm.launch_file).unwrap();
        assert!(launch.exists());

        // One lesson named after the chapter.
        let outline = repo.course_outline(course).await.unwrap();
        assert_eq!(outline.chapters.len(), 1);
        assert_eq!(outline.chapters[0].lessons.len(), 1);
        assert_eq!(outline.chapters[0].lessons[0].title, "Unit 1");

        // Renaming re-extracts under the new title and drops the old tree.
        let renamed = repo
            .upsert_chapter(
                &author(),
                &ChapterInput {
                    id: Some(chapter.id),
                    course,
                    title: "Unit One".to_string(),
                    scorm_package: Some(upload),
                },
            )
            .await
            .unwrap();
        let new_scorm = renamed.scorm.clone().unwrap();
        assert_ne!(new_scorm.scorm_package_path, scorm.scorm_package_path);
        assert!(!launch.exists());
        assert_eq!(
            repo.course_outline(course).await.unwrap().chapters[0].lessons.len(),
            1
        );

        let dir = repo
            .importer()
            .assets()
            .resolve_public(&new_scorm.scorm_package_path)
            .unwrap();
        repo.delete_chapter(&author(), renamed.id).await.unwrap();
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_scorm_title_clash_keeps_first_package() {
        let fx = setup().await;
        let repo = &fx.repo;
        let course = course(repo).await;

        let first = repo
            .upsert_chapter(
                &author(),
                &ChapterInput {
                    id: None,
                    course,
                    title: "Unit".to_string(),
                    scorm_package: Some(upload_package(repo)),
                },
            )
            .await
            .unwrap();
        let scorm = first.scorm.clone().unwrap();
        let launch = repo.importer().assets().resolve_public(&scorm.launch_file).unwrap();

        let err = repo
            .upsert_chapter(
                &author(),
                &ChapterInput {
                    id: None,
                    course,
                    title: " Unit ".to_string(),
                    scorm_package: Some(upload_package(repo)),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(launch.exists());
        assert_eq!(repo.course_outline(course).await.unwrap().chapters.len(), 1);

        // Re-uploading to the chapter that owns the directory is allowed.
        let updated = repo
            .upsert_chapter(
                &author(),
                &ChapterInput {
                    id: Some(first.id),
                    course,
                    title: "Unit".to_string(),
                    scorm_package: Some(upload_package(repo)),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.scorm.unwrap().scorm_package_path, scorm.scorm_package_path);
        assert!(launch.exists());

        // A broken re-upload leaves the live package in place.
        let broken = repo
            .importer()
            .assets()
            .store_upload("broken.zip", b"not a zip", false)
            .unwrap();
        assert!(
            repo.upsert_chapter(
                &author(),
                &ChapterInput {
                    id: Some(first.id),
                    course,
                    title: "Unit".to_string(),
                    scorm_package: Some(broken),
                },
            )
            .await
            .is_err()
        );
        assert!(launch.exists());
    }

    #[tokio::test]
    async fn test_bad_package_leaves_no_chapter() {
        let fx = setup().await;
        let repo = &fx.repo;
        let course = course(repo).await;
        let upload = repo
            .importer()
            .assets()
            .store_upload("broken.zip", b"not a zip", false)
            .unwrap();

        let err = repo
            .upsert_chapter(
                &author(),
                &ChapterInput {
                    id: None,
                    course,
                    title: "Broken".to_string(),
                    scorm_package: Some(upload),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Scorm(lms_scorm::ScormError::InvalidArchive(_))));
        assert!(repo.course_outline(course).await.unwrap().chapters.is_empty());
    }

    #[tokio::test]
    async fn test_students_cannot_author() {
        let fx = setup().await;
        let student = Caller::new("student@example.com", [Role::LmsStudent]);
        let err = fx
            .repo
            .create_course(
                &student,
                &CourseInput {
                    title: "Nope".to_string(),
                    short_introduction: None,
                    published: false,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn test_join_request_workflow() {
        let fx = setup().await;
        let repo = &fx.repo;
        let store = repo.store();
        let course = course(repo).await;

        let suffix = Uuid::new_v4().simple().to_string();
        let instructor = format!("instructor-{}@example.com", suffix);
        let mentor = format!("mentor-{}@example.com", suffix);
        let learner = format!("learner-{}@example.com", suffix);
        for email in [&instructor, &mentor, &learner] {
            store.upsert_user(email, None, None).await.unwrap();
        }

        let cohort = store
            .insert_cohort(course.0, "spring", "Spring", &instructor)
            .await
            .unwrap();
        let subgroup = store
            .insert_subgroup(cohort.id, "team-a", "Team A", "secret")
            .await
            .unwrap();
        let subgroup_id = SubgroupId::from_uuid(subgroup.id);

        let learner_caller = Caller::new(learner.clone(), [Role::LmsStudent]);
        let err = repo
            .join_cohort(&learner_caller, course, "spring", "team-a", "wrong")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid join link");

        let first = repo
            .join_cohort(&learner_caller, course, "spring", "team-a", "secret")
            .await
            .unwrap();
        assert!(matches!(first, JoinOutcome::Created(_)));
        let again = repo
            .join_cohort(&learner_caller, course, "spring", "team-a", "secret")
            .await
            .unwrap();
        assert!(matches!(again, JoinOutcome::Existing(_)));
        assert_eq!(again.request().id, first.request().id);
        let request = first.request().id;

        // Not yet a mentor.
        let mentor_caller = Caller::new(mentor.clone(), [Role::LmsStudent]);
        let err = repo
            .decide_join_request(&mentor_caller, request, JoinDecision::Approve)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::PermissionDenied(_)));

        // Only cohort admins may add mentors.
        assert!(
            repo.add_mentor(&mentor_caller, subgroup_id, &mentor)
                .await
                .is_err()
        );
        let instructor_caller = Caller::new(instructor.clone(), std::iter::empty::<Role>());
        assert!(
            repo.add_mentor(&instructor_caller, subgroup_id, &mentor)
                .await
                .unwrap()
        );
        assert!(matches!(
            repo.add_mentor(&instructor_caller, subgroup_id, "ghost@example.com")
                .await,
            Err(StoreError::NotFound { kind: "user", .. })
        ));

        let rejected = repo
            .decide_join_request(&mentor_caller, request, JoinDecision::Reject)
            .await
            .unwrap();
        assert_eq!(rejected.status, JoinRequestStatus::Rejected);

        let err = repo
            .decide_join_request(&mentor_caller, request, JoinDecision::Approve)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid Join Request");

        let undone = repo
            .decide_join_request(&mentor_caller, request, JoinDecision::UndoReject)
            .await
            .unwrap();
        assert_eq!(undone.status, JoinRequestStatus::Pending);

        let manager = Caller::new("root@example.com", [Role::SystemManager]);
        let approved = repo
            .decide_join_request(&manager, request, JoinDecision::Approve)
            .await
            .unwrap();
        assert_eq!(approved.status, JoinRequestStatus::Accepted);
    }

    #[tokio::test]
    async fn test_bulk_delete_requires_moderator() {
        let fx = setup().await;
        let repo = &fx.repo;
        let course = course(repo).await;

        let err = repo
            .delete_documents(&author(), DocumentKind::Course, &[course.to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::PermissionDenied(_)));

        let moderator = Caller::new("mod@example.com", [Role::Moderator]);
        let err = repo
            .delete_documents(&moderator, DocumentKind::Course, &["nope".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        let deleted = repo
            .delete_documents(&moderator, DocumentKind::Course, &[course.to_string()])
            .await
            .unwrap();
        assert_eq!(deleted, 1);
        assert!(repo.course_outline(course).await.is_err());
    }

    #[tokio::test]
    async fn test_evaluation_rating_is_normalised() {
        let fx = setup().await;
        let repo = &fx.repo;
        let course = course(repo).await;
        let evaluator = Caller::new("eval@example.com", [Role::BatchEvaluator]);
        let member = format!("{}@example.com", Uuid::new_v4());

        let input = EvaluationInput {
            member: member.clone(),
            course,
            batch_name: None,
            evaluator: Some("eval@example.com".to_string()),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            status: EvaluationStatus::Pass,
            rating: 4.0,
            summary: None,
        };
        let id = repo.save_evaluation(&evaluator, &input).await.unwrap();

        let stored = repo.store().get_evaluation(&member, course.0).await.unwrap();
        assert_eq!(stored.id, id.0);
        assert!((stored.rating - 0.8).abs() < f64::EPSILON);

        let err = repo
            .save_evaluation(&evaluator, &EvaluationInput { rating: 7.0, ..input })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    fn moderator() -> Caller {
        Caller::new("moderator@example.com", [Role::Moderator])
    }

    fn profile(email: &str, full_name: &str, roles: Vec<Role>) -> UserProfile {
        UserProfile {
            email: email.to_string(),
            full_name: Some(full_name.to_string()),
            username: None,
            user_image: None,
            enabled: true,
            roles,
        }
    }

    #[tokio::test]
    async fn test_member_directory() {
        let fx = setup().await;
        let repo = &fx.repo;
        let suffix = Uuid::new_v4().simple().to_string();
        let mentor = format!("mentor-{}@example.com", suffix);
        let student = format!("student-{}@example.com", suffix);
        let retired = format!("retired-{}@example.com", suffix);

        let err = repo
            .save_user(&author(), &profile(&mentor, "Mentor", vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::PermissionDenied(_)));

        repo.save_user(
            &moderator(),
            &profile(&mentor, "Mentor", vec![Role::LmsStudent, Role::CourseCreator]),
        )
        .await
        .unwrap();
        repo.save_user(&moderator(), &profile(&student, "Student", vec![Role::LmsStudent]))
            .await
            .unwrap();
        let mut disabled = profile(&retired, "Retired", vec![Role::Moderator]);
        disabled.enabled = false;
        repo.save_user(&moderator(), &disabled).await.unwrap();

        let members = repo.members(Some(&suffix), 0).await.unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].name, student);
        assert_eq!(members[0].role, Some(Role::LmsStudent));
        assert_eq!(members[1].name, mentor);
        assert_eq!(members[1].role, Some(Role::CourseCreator));

        assert!(repo.members(Some(&suffix), 2).await.unwrap().is_empty());
        assert!(repo.members(Some("%_%"), 0).await.unwrap().iter().all(|m| {
            m.name.contains("%_%") || m.full_name.as_deref().is_some_and(|n| n.contains("%_%"))
        }));

        // Saving again replaces the role set.
        repo.save_user(&moderator(), &profile(&mentor, "Mentor", vec![Role::LmsStudent]))
            .await
            .unwrap();
        let members = repo.members(Some(&format!("MENTOR-{}", suffix)), 0).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].role, Some(Role::LmsStudent));

        let users = repo.all_users().await.unwrap();
        assert_eq!(users[&student].full_name.as_deref(), Some("Student"));
        assert!(!users.contains_key(&retired));
    }

    #[tokio::test]
    async fn test_reviews_feed_course_statistics() {
        let fx = setup().await;
        let repo = &fx.repo;
        let store = repo.store();
        let course = course(repo).await;
        let suffix = Uuid::new_v4().simple().to_string();
        let ada = Caller::new(format!("ada-{}@example.com", suffix), [Role::LmsStudent]);
        let bob = Caller::new(format!("bob-{}@example.com", suffix), [Role::LmsStudent]);
        for caller in [&ada, &bob] {
            store.upsert_user(&caller.user, None, None).await.unwrap();
        }

        let review = |rating| ReviewInput {
            course,
            rating,
            review: Some("Clear and short".to_string()),
        };

        let err = repo.save_review(&ada, &review(4.0)).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        store.enroll(course.0, &ada.user).await.unwrap();
        store.enroll(course.0, &bob.user).await.unwrap();
        let err = repo.save_review(&ada, &review(6.0)).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        let first = repo.save_review(&ada, &review(2.0)).await.unwrap();
        assert_eq!(repo.save_review(&ada, &review(5.0)).await.unwrap(), first);
        repo.save_review(&bob, &review(3.0)).await.unwrap();

        let err = repo.update_course_statistics(&author()).await.unwrap_err();
        assert!(matches!(err, StoreError::PermissionDenied(_)));
        assert!(repo.update_course_statistics(&moderator()).await.unwrap() >= 1);

        let refreshed = repo.course_outline(course).await.unwrap().course;
        assert_eq!(refreshed.enrollments, 2);
        assert_eq!(refreshed.lessons, 0);
        assert!((refreshed.rating - 0.8).abs() < 1e-9);
    }
}
