//! Schema definitions and migration utilities.

use sqlx::PgPool;

use crate::error::{StoreError, StoreResult};

/// Embedded migration SQL for the schema (001_schema.sql).
pub const SCHEMA_MIGRATION: &str = include_str!("../../../migrations/001_schema.sql");

/// Run the schema migration against the database.
///
/// Idempotent: every statement checks for existing objects.
pub async fn run_migrations(pool: &PgPool) -> StoreResult<()> {
    tracing::info!("Running database migrations...");

    sqlx::raw_sql(SCHEMA_MIGRATION)
        .execute(pool)
        .await
        .map_err(|e| StoreError::MigrationError(format!("Schema migration failed: {}", e)))?;

    tracing::info!("Migrations completed successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_migration_embedded() {
        for table in [
            "users",
            "user_roles",
            "courses",
            "chapters",
            "chapter_references",
            "lessons",
            "lesson_references",
            "enrollments",
            "course_progress",
            "course_reviews",
            "cohorts",
            "cohort_subgroups",
            "cohort_join_requests",
            "certificates",
            "certificate_evaluations",
        ] {
            assert!(
                SCHEMA_MIGRATION.contains(&format!("CREATE TABLE IF NOT EXISTS {} (", table)),
                "missing table {}",
                table
            );
        }
    }

    #[test]
    fn test_lesson_order_constraint_is_deferred() {
        assert!(SCHEMA_MIGRATION.contains(
            "CONSTRAINT lesson_references_chapter_idx UNIQUE (chapter_id, idx) DEFERRABLE INITIALLY DEFERRED"
        ));
    }
}
