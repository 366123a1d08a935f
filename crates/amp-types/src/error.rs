use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid automerge URL: {0}")]
    InvalidAddress(String),

    #[error("invalid document id: {0}")]
    InvalidDocumentId(String),
}
