//! Document store boundary for automerge packages.
//!
//! The synchronized document store is an external collaborator. This crate
//! pins down the slice of it the package engine relies on: fetching a
//! document snapshot by identifier, reading its revision heads, validating
//! identifiers, and shutting the connection down.
//!
//! # Documents
//!
//! - [`FolderDocument`] -- ordered list of named child references
//! - [`FileDocument`] -- file content (text or bytes) plus permissions
//!
//! # Backends
//!
//! All backends implement the [`DocumentStore`] trait:
//!
//! - [`InMemoryDocumentStore`] -- `HashMap`-based store for tests and embedding
//! - [`DirectoryDocumentStore`] -- one JSON file per document on local disk
//!
//! Callers never talk to a backend directly; they go through
//! [`StoreClient`], which bounds every fetch with a timeout, cancels the
//! in-flight request when the bound expires, and caps concurrent fetches.

pub mod client;
pub mod config;
pub mod directory;
pub mod document;
pub mod error;
pub mod history;
pub mod memory;
pub mod traits;

pub use client::StoreClient;
pub use config::{connect, StoreConfig, DEFAULT_ENDPOINT};
pub use directory::DirectoryDocumentStore;
pub use document::{DirEntry, Document, EntryKind, FileContent, FileDocument, FileMetadata, FolderDocument};
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryDocumentStore;
pub use traits::{DocumentHandle, DocumentStore};
