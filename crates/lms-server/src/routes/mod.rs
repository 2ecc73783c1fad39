//! Route definitions for the HTTP API.

pub mod certification;
pub mod chapters;
pub mod cohorts;
pub mod courses;
pub mod documents;
pub mod files;
pub mod health;
pub mod lessons;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the complete router with all routes.
pub fn build_router(state: AppState) -> Router {
    let max_upload_bytes = state.config().max_upload_bytes;
    Router::new()
        .merge(health::routes())
        .merge(users::routes())
        .merge(files::routes(max_upload_bytes))
        .merge(courses::routes())
        .merge(chapters::routes())
        .merge(lessons::routes())
        .merge(cohorts::routes())
        .merge(certification::routes())
        .merge(documents::routes())
        .with_state(state)
}
