//! Package-manager plugin for `automerge:` specifiers.
//!
//! [`AutomergePlugin`] is what a host registers. It answers the two host
//! questions, "what is this specifier?" ([`resolve`](AutomergePlugin::resolve))
//! and "give me its files" ([`fetch`](AutomergePlugin::fetch)), and owns the
//! document-store connection both share.
//!
//! ```text
//! specifier ─▶ PackageAddress ─▶ resolve_package ─▶ ResolvedPackage
//!                    │
//!                    └─▶ resolve_walk_root ─▶ TreeWalker ─▶ materialize ─▶ archive
//! ```

pub mod cas;
pub mod config;
pub mod error;
pub mod plugin;

pub use cas::{LocalTarball, LocalTarballFetcher};
pub use config::PluginConfig;
pub use error::{PluginError, PluginResult};
pub use plugin::{AutomergePlugin, PluginOptions};

pub use amp_pack::{ArchiveHandle, MaterializedPackage};
pub use amp_tree::ResolvedPackage;
pub use amp_types::{PackageAddress, Resolution};
