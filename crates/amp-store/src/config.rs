use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::directory::DirectoryDocumentStore;
use crate::error::{StoreError, StoreResult};
use crate::memory::InMemoryDocumentStore;
use crate::traits::DocumentStore;

/// Public sync server used when no endpoint is configured.
pub const DEFAULT_ENDPOINT: &str = "wss://sync3.automerge.org";

/// Store connection settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Where documents come from: `memory:`, `file://<dir>`, or a local path.
    pub endpoint: String,
    /// Bound on every single document fetch, in milliseconds.
    pub timeout_ms: u64,
    /// Maximum number of fetches in flight at once.
    pub max_in_flight: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_ms: 30_000,
            max_in_flight: 8,
        }
    }
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The directory behind a `file://` or plain-path endpoint.
    pub fn local_dir(&self) -> Option<PathBuf> {
        local_dir(self.endpoint.trim())
    }
}

/// Open a store connection for the configured endpoint.
///
/// Network transports are not bundled; `ws://` and `wss://` endpoints fail
/// with [`StoreError::UnsupportedEndpoint`]. Embedders with a network client
/// supply their own [`DocumentStore`] instead.
pub fn connect(config: &StoreConfig) -> StoreResult<Arc<dyn DocumentStore>> {
    let endpoint = config.endpoint.trim();
    if endpoint == "memory:" {
        info!("using in-memory document store");
        return Ok(Arc::new(InMemoryDocumentStore::new()));
    }
    if let Some(dir) = local_dir(endpoint) {
        info!(root = %dir.display(), "using directory document store");
        return Ok(Arc::new(DirectoryDocumentStore::open(dir)?));
    }
    Err(StoreError::UnsupportedEndpoint(endpoint.to_string()))
}

fn local_dir(endpoint: &str) -> Option<PathBuf> {
    if let Some(path) = endpoint.strip_prefix("file://") {
        return (!path.is_empty()).then(|| PathBuf::from(path));
    }
    if endpoint.contains("://") || endpoint.is_empty() || endpoint == "memory:" {
        return None;
    }
    Some(PathBuf::from(endpoint))
}
