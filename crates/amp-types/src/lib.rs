//! Foundation types for automerge packages.
//!
//! A package lives in a synchronized document store as a graph of folder and
//! file documents. This crate provides the identifiers and small value types
//! every other crate in the workspace shares.
//!
//! # Key Types
//!
//! - [`DocumentId`]: Scheme-qualified document identifier (`automerge:...`)
//! - [`PackageAddress`]: Parsed package specifier: root document plus optional subpath
//! - [`RevisionFingerprint`]: Store-provided heads summarizing a document's history
//! - [`Resolution`]: The record a host hands back to the fetcher

pub mod address;
pub mod error;
pub mod id;
pub mod resolution;
pub mod revision;

pub use address::{has_scheme, PackageAddress};
pub use error::TypeError;
pub use id::{DocumentId, SCHEME_PREFIX};
pub use resolution::{Resolution, RESOLUTION_TYPE, RESOLVED_VIA};
pub use revision::RevisionFingerprint;
