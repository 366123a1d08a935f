//! Hand-off to a host's own tarball fetcher.
//!
//! Some hosts want every package to pass through their content-addressable
//! store. For those, the plugin builds the archive and then delegates to the
//! host's local-tarball fetcher, which imports it and returns whatever the
//! host uses to describe a fetched package.

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// A tarball on the local filesystem, addressed the way hosts expect
/// (`file:<path>`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalTarball {
    path: PathBuf,
}

impl LocalTarball {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The `file:` specifier for this tarball.
    pub fn specifier(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

impl fmt::Display for LocalTarball {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.specifier())
    }
}

/// The host's fetcher for local tarballs.
///
/// The tarball is deleted as soon as this call returns, so implementations
/// must copy or import it before returning.
#[async_trait]
pub trait LocalTarballFetcher: Send + Sync {
    /// The host's content-addressable storage context.
    type Cas: Send + Sync;
    /// Host-specific fetch options, passed through untouched.
    type Options: Send + Sync;
    type Output: Send;
    type Error: std::error::Error + Send + Sync + 'static;

    async fn fetch_local_tarball(
        &self,
        cas: &Self::Cas,
        tarball: &LocalTarball,
        options: &Self::Options,
    ) -> Result<Self::Output, Self::Error>;
}
