use std::time::Duration;

use amp_types::DocumentId;

/// Errors from document store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested document does not exist in the store.
    #[error("document not found: {0}")]
    NotFound(DocumentId),

    /// The bounded wait for a document expired.
    #[error("timed out after {timeout:?} waiting for document {id}")]
    Timeout { id: DocumentId, timeout: Duration },

    /// The request was cancelled before the document arrived.
    #[error("fetch of document {0} was cancelled")]
    Cancelled(DocumentId),

    /// The document exists but is not the kind the caller needs.
    #[error("document {id} is a {found}, expected a {expected}")]
    UnexpectedKind {
        id: DocumentId,
        expected: &'static str,
        found: &'static str,
    },

    /// The store connection has been shut down.
    #[error("document store is shut down")]
    Closed,

    /// The configured endpoint cannot be served by any available backend.
    #[error("unsupported store endpoint: {0}")]
    UnsupportedEndpoint(String),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
