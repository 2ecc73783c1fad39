//! lms-core: Core types for the LMS backend
//!
//! This crate provides:
//! - Typed identifiers and records for courses, chapters, lessons, cohorts,
//!   certificates and evaluations
//! - The explicit [`Caller`] identity with its site-wide roles
//! - The pure lesson-ordering algebra used by the reorder operation
//!
//! Nothing here performs I/O; the store and server crates build on it.

pub mod caller;
pub mod error;
pub mod ordering;
pub mod types;

pub use caller::{AUTHORING_ROLES, Caller, EVALUATION_ROLES, PRIMARY_ROLE_ORDER, Role, primary_role};
pub use error::{CoreError, require_non_empty};
pub use ordering::{ChapterOrdering, LessonMove, OrderingError, ReorderPlan};
pub use types::*;
