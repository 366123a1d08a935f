use std::sync::Arc;
use std::time::Duration;

use amp_types::DocumentId;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::document::{FileDocument, FolderDocument};
use crate::error::{StoreError, StoreResult};
use crate::traits::{DocumentHandle, DocumentStore};

/// Bounded-wait access to a shared [`DocumentStore`].
///
/// Every fetch runs under a timeout. When it expires, the request's
/// cancellation token fires and the call fails with
/// [`StoreError::Timeout`]. A semaphore caps how many fetches are in flight
/// across all concurrent walks on the same client.
#[derive(Clone)]
pub struct StoreClient {
    store: Arc<dyn DocumentStore>,
    timeout: Duration,
    permits: Arc<Semaphore>,
    cancel: CancellationToken,
}

impl StoreClient {
    pub fn new(store: Arc<dyn DocumentStore>, timeout: Duration, max_in_flight: usize) -> Self {
        Self {
            store,
            timeout,
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
            cancel: CancellationToken::new(),
        }
    }

    pub fn from_config(store: Arc<dyn DocumentStore>, config: &StoreConfig) -> Self {
        Self::new(store, config.timeout(), config.max_in_flight)
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The store's identifier-validity predicate.
    pub fn is_valid_id(&self, raw: &str) -> bool {
        self.store.is_valid_id(raw)
    }

    /// Fetch a document, bounded by the client timeout.
    pub async fn find(&self, id: &DocumentId) -> StoreResult<DocumentHandle> {
        let _permit = self.permits.acquire().await.map_err(|_| StoreError::Closed)?;
        let request = self.cancel.child_token();

        debug!(id = %id, "fetching document");
        match tokio::time::timeout(self.timeout, self.store.find(id, &request)).await {
            Ok(result) => result,
            Err(_) => {
                request.cancel();
                warn!(id = %id, timeout = ?self.timeout, "document fetch timed out");
                Err(StoreError::Timeout {
                    id: id.clone(),
                    timeout: self.timeout,
                })
            }
        }
    }

    /// Fetch a document that must be a folder.
    pub async fn find_folder(&self, id: &DocumentId) -> StoreResult<FolderDocument> {
        self.find(id).await?.into_folder()
    }

    /// Fetch a document that must be a file.
    pub async fn find_file(&self, id: &DocumentId) -> StoreResult<FileDocument> {
        self.find(id).await?.into_file()
    }

    /// Cancel every in-flight fetch and refuse new ones.
    pub fn close(&self) {
        self.cancel.cancel();
        self.permits.close();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl std::fmt::Debug for StoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreClient")
            .field("timeout", &self.timeout)
            .field("available_permits", &self.permits.available_permits())
            .field("closed", &self.is_closed())
            .finish()
    }
}
