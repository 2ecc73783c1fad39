//! lms-store: Storage layer for the LMS backend
//!
//! This crate provides:
//! - PostgreSQL storage for courses, chapters, lessons and their ordering
//! - Cohort join-request workflows, certificates and evaluations
//! - Migration management
//! - The caller-checked [`Repository`] used by the HTTP layer
//!
//! # Usage
//!
//! ```rust,ignore
//! use lms_store::{Repository, Store, StoreConfig};
//!
//! let config = StoreConfig::from_env()?;
//! let store = Store::connect(config).await?;
//! let repo = Repository::new(store, importer);
//!
//! repo.reorder_lesson(&caller, &LessonMove { lesson, source, target, index: 0 }).await?;
//! ```

pub mod error;
pub mod models;
pub mod repository;
pub mod schema;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use models::*;
pub use repository::{
    CertificateInput, ChapterInput, CourseInput, EvaluationInput, JoinOutcome, LessonInput,
    Repository,
};
pub use store::{Store, StoreConfig, Upserted};

// Re-export lms-core for downstream crates
pub use lms_core;
