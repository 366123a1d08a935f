use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use amp_types::{DocumentId, RevisionFingerprint};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::document::Document;
use crate::error::{StoreError, StoreResult};
use crate::history;
use crate::traits::{DocumentHandle, DocumentStore};

struct StoredDocument {
    doc: Document,
    heads: RevisionFingerprint,
}

/// In-memory, HashMap-based document store.
///
/// Intended for tests and embedding. Documents are held behind a `RwLock`
/// and cloned on read. Every [`put`](Self::put) advances the document's
/// heads, so fingerprints behave like a real store's.
pub struct InMemoryDocumentStore {
    docs: RwLock<HashMap<DocumentId, StoredDocument>>,
    withheld: RwLock<HashSet<DocumentId>>,
    closed: AtomicBool,
    finds: AtomicUsize,
    shutdowns: AtomicUsize,
}

impl InMemoryDocumentStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(HashMap::new()),
            withheld: RwLock::new(HashSet::new()),
            closed: AtomicBool::new(false),
            finds: AtomicUsize::new(0),
            shutdowns: AtomicUsize::new(0),
        }
    }

    /// Write a document under `id`, returning its new heads.
    pub fn put(&self, id: &DocumentId, doc: impl Into<Document>) -> StoreResult<RevisionFingerprint> {
        let doc = doc.into();
        let mut map = self.docs.write().expect("lock poisoned");
        let heads = history::advance(map.get(id).map(|d| &d.heads), &doc)?;
        map.insert(id.clone(), StoredDocument { doc, heads: heads.clone() });
        Ok(heads)
    }

    /// Write a document under a freshly minted identifier.
    pub fn insert(&self, doc: impl Into<Document>) -> StoreResult<DocumentId> {
        let id = DocumentId::generate();
        self.put(&id, doc)?;
        Ok(id)
    }

    /// Current snapshot of a document.
    pub fn get(&self, id: &DocumentId) -> Option<Document> {
        self.docs.read().expect("lock poisoned").get(id).map(|d| d.doc.clone())
    }

    /// Delete a document. Returns `true` if it existed.
    pub fn remove(&self, id: &DocumentId) -> bool {
        self.docs.write().expect("lock poisoned").remove(id).is_some()
    }

    /// Make `find` on this identifier wait forever (until cancelled), as if
    /// the document never arrives from the network.
    pub fn withhold(&self, id: &DocumentId) {
        self.withheld.write().expect("lock poisoned").insert(id.clone());
    }

    /// Number of documents stored.
    pub fn len(&self) -> usize {
        self.docs.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.docs.read().expect("lock poisoned").is_empty()
    }

    /// Total number of `find` calls served.
    pub fn find_count(&self) -> usize {
        self.finds.load(Ordering::SeqCst)
    }

    /// Number of times `shutdown` has been called.
    pub fn shutdown_count(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn find(&self, id: &DocumentId, cancel: &CancellationToken) -> StoreResult<DocumentHandle> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        if self.is_closed() {
            return Err(StoreError::Closed);
        }

        let withheld = self.withheld.read().expect("lock poisoned").contains(id);
        if withheld {
            debug!(id = %id, "document withheld, waiting for cancellation");
            cancel.cancelled().await;
            return Err(StoreError::Cancelled(id.clone()));
        }

        let map = self.docs.read().expect("lock poisoned");
        let stored = map.get(id).ok_or_else(|| StoreError::NotFound(id.clone()))?;
        Ok(DocumentHandle::new(id.clone(), stored.doc.clone(), stored.heads.clone()))
    }

    async fn shutdown(&self) -> StoreResult<()> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryDocumentStore")
            .field("document_count", &self.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}
