//! Folder-graph traversal for automerge packages.
//!
//! A package is a folder document whose entries point at file documents and
//! further folder documents. This crate turns that graph into things a
//! package manager understands:
//!
//! - [`TreeWalker`] flattens a folder subtree into ordered [`FileEntry`] values
//! - [`resolve_walk_root`] follows an address's subpath down to the folder to walk
//! - [`resolve_package`] reads `package.json` and derives the cache identity
//!
//! All document access goes through [`amp_store::StoreClient`], so every
//! fetch is bounded by its timeout.
//!
//! # Consistency
//!
//! Each folder and file is read at the moment the walk reaches it. If the
//! graph is edited concurrently, a walk may observe files from before and
//! after the edit. Callers that need a coherent snapshot must re-resolve.

pub mod error;
pub mod identity;
pub mod manifest;
pub mod subpath;
pub mod walker;

pub use error::{TreeError, TreeResult};
pub use identity::{resolve_package, PackageIdentity, ResolvedPackage};
pub use manifest::{read_manifest, PackageManifest, MANIFEST_FILE};
pub use subpath::{resolve_subpath, resolve_walk_root};
pub use walker::{FileEntry, TreeWalker, DEFAULT_FAN_OUT};

#[cfg(test)]
mod testing;
