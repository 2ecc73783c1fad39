//! Application state shared across handlers.

use std::sync::Arc;

use lms_scorm::{AssetRoot, ScormImporter};
use lms_store::{Repository, Store};

use crate::config::ServerConfig;

/// Application state shared across all handlers.
///
/// This is cloneable and can be extracted in handlers using `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    repository: Arc<Repository>,
    config: Arc<ServerConfig>,
}

impl AppState {
    /// Create application state over a connected store.
    ///
    /// The SCORM importer works under the configured asset roots.
    pub fn new(store: Store, config: ServerConfig) -> Self {
        let assets = AssetRoot::new(config.public_root.clone(), config.private_root.clone());
        let repository = Repository::new(store, ScormImporter::new(assets));
        Self {
            repository: Arc::new(repository),
            config: Arc::new(config),
        }
    }

    /// Get a reference to the caller-checked repository.
    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    /// Get a reference to the asset store used for uploads.
    pub fn assets(&self) -> &AssetRoot {
        self.repository.importer().assets()
    }

    /// Get a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("port", &self.config.port)
            .field("public_root", &self.config.public_root)
            .finish_non_exhaustive()
    }
}
