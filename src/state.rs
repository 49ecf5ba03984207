//! Application state management

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::Response;

use crate::artifacts::ArtifactStore;
use crate::catalog::{self, OperationDescriptor};
use crate::config::Config;
use crate::error::ToolError;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    store: ArtifactStore,
}

impl AppState {
    /// Create a new application state
    ///
    /// Directories are injected through `store` so tests can point them at
    /// temporary locations.
    pub fn new(config: Config, store: ArtifactStore) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, store }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the artifact store
    pub fn store(&self) -> &ArtifactStore {
        &self.inner.store
    }

    /// Get the tool catalog
    pub fn catalog(&self) -> &'static [OperationDescriptor] {
        catalog::all()
    }

    /// Render a tool failure, honouring the in-band status setting
    pub fn tool_error(&self, err: ToolError) -> Response {
        let status = if self.inner.config.server.legacy_status {
            StatusCode::OK
        } else {
            err.status_code()
        };
        err.into_response_with_status(status)
    }
}
