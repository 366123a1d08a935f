use std::time::Duration;

use amp_store::StoreError;
use amp_types::{DocumentId, TypeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TreeError {
    #[error(transparent)]
    InvalidAddress(#[from] TypeError),

    #[error("timed out after {timeout:?} waiting for document {id}")]
    StoreTimeout { id: DocumentId, timeout: Duration },

    #[error("missing document {id} at {path:?}")]
    MissingDocument { id: DocumentId, path: String },

    #[error("subfolder {segment:?} not found in {folder} (resolving subpath {subpath:?})")]
    SubpathNotFound {
        segment: String,
        subpath: String,
        folder: DocumentId,
    },

    #[error("no package.json found in automerge folder document {root}")]
    ManifestNotFound { root: DocumentId },

    #[error("invalid package.json in document {id}: {reason}")]
    ManifestParseError { id: DocumentId, reason: String },

    #[error("folder {id} at {path:?} contains itself")]
    CyclicGraph { id: DocumentId, path: String },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl TreeError {
    /// Attach walk context to a store failure.
    ///
    /// `path` is the walk-relative path of the entry that referenced the
    /// document (empty for the walk root).
    pub fn from_store(err: StoreError, path: &str) -> Self {
        match err {
            StoreError::NotFound(id) => Self::MissingDocument {
                id,
                path: path.to_string(),
            },
            StoreError::Timeout { id, timeout } => Self::StoreTimeout { id, timeout },
            other => Self::Store(other),
        }
    }

    /// Returns `true` if retrying the same call later might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreTimeout { .. })
    }
}

pub type TreeResult<T> = Result<T, TreeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_becomes_missing_document() {
        let id = DocumentId::parse("automerge:gone").unwrap();
        let err = TreeError::from_store(StoreError::NotFound(id.clone()), "src/index.js");
        match err {
            TreeError::MissingDocument { id: missing, path } => {
                assert_eq!(missing, id);
                assert_eq!(path, "src/index.js");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn timeout_is_retryable() {
        let id = DocumentId::parse("automerge:slow").unwrap();
        let err = TreeError::from_store(
            StoreError::Timeout { id, timeout: Duration::from_secs(1) },
            "",
        );
        assert!(err.is_retryable());
        assert!(!TreeError::from_store(StoreError::Closed, "").is_retryable());
    }

    #[test]
    fn manifest_not_found_message() {
        let root = DocumentId::parse("automerge:emptyFolder").unwrap();
        let msg = TreeError::ManifestNotFound { root }.to_string();
        assert!(msg.starts_with("no package.json found"));
    }
}
