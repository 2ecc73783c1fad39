//! lms-server: HTTP API server for the LMS backend
//!
//! This crate provides:
//! - REST endpoints for courses, chapters, lessons and lesson reordering
//! - SCORM package upload and import
//! - Cohort join-request workflows, evaluations and certificates
//! - Bearer-token caller identity
//!
//! # Architecture
//!
//! The server is built on Axum with a middleware stack for:
//! - Request tracing and logging
//! - CORS handling
//! - Request ID generation
//! - JSON error responses
//!
//! # Usage
//!
//! ```rust,ignore
//! use lms_server::{build_app, config::ServerConfig, state::AppState};
//!
//! let config = ServerConfig::from_env()?;
//! let store = Store::connect(StoreConfig::from_env()?).await?;
//! let app = build_app(AppState::new(store, config));
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::Router;
use http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use auth::CallerIdentity;
pub use config::{ConfigError, LogFormat, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use state::AppState;

// Re-export dependent crates
pub use lms_store;

use crate::middleware::request_id::{propagate_request_id, request_id_layer};

/// Build the router with the full middleware stack.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config().cors_allowed_origins);

    routes::build_router(state)
        .layer(axum::middleware::from_fn(propagate_request_id))
        .layer(request_id_layer())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Build CORS layer from configuration.
///
/// Origins that are not valid header values are skipped with a warning.
pub fn build_cors_layer(allowed_origins: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed_origins.trim() == "*" {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}
