use amp_types::{DocumentId, RevisionFingerprint};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::document::{Document, FileDocument, FolderDocument};
use crate::error::{StoreError, StoreResult};

/// A fetched document: a snapshot plus the heads it was taken at.
#[derive(Clone, Debug)]
pub struct DocumentHandle {
    id: DocumentId,
    doc: Document,
    heads: RevisionFingerprint,
}

impl DocumentHandle {
    pub fn new(id: DocumentId, doc: Document, heads: RevisionFingerprint) -> Self {
        Self { id, doc, heads }
    }

    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    /// Synchronous snapshot accessor.
    pub fn doc(&self) -> &Document {
        &self.doc
    }

    /// Revision fingerprint of the snapshot.
    pub fn heads(&self) -> &RevisionFingerprint {
        &self.heads
    }

    /// Take the snapshot as a folder.
    pub fn into_folder(self) -> StoreResult<FolderDocument> {
        match self.doc {
            Document::Folder(folder) => Ok(folder),
            other => Err(StoreError::UnexpectedKind {
                id: self.id,
                expected: "folder",
                found: other.kind_name(),
            }),
        }
    }

    /// Take the snapshot as a file.
    pub fn into_file(self) -> StoreResult<FileDocument> {
        match self.doc {
            Document::File(file) => Ok(file),
            other => Err(StoreError::UnexpectedKind {
                id: self.id,
                expected: "file",
                found: other.kind_name(),
            }),
        }
    }
}

/// The external document store.
///
/// Implementations must be safe for concurrent use: one connection is shared
/// by every in-flight resolve and fetch on a plugin instance.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document snapshot by identifier.
    ///
    /// Returns `StoreError::NotFound` if the store knows the document does
    /// not exist. May wait for the document to arrive; implementations must
    /// stop waiting and return `StoreError::Cancelled` once `cancel` fires.
    async fn find(&self, id: &DocumentId, cancel: &CancellationToken) -> StoreResult<DocumentHandle>;

    /// Identifier-validity predicate for this store's URL syntax.
    fn is_valid_id(&self, raw: &str) -> bool {
        DocumentId::is_valid(raw)
    }

    /// Release the connection. Finds after shutdown fail with `StoreError::Closed`.
    async fn shutdown(&self) -> StoreResult<()>;
}
