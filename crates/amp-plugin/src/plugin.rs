use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use amp_pack::{archive, materialize, ArchiveHandle, MaterializedPackage};
use amp_store::{connect, DocumentStore, StoreClient};
use amp_tree::{resolve_package, resolve_walk_root, ResolvedPackage, TreeWalker};
use amp_types::{has_scheme, PackageAddress, Resolution};
use tracing::{debug, info, warn};

use crate::cas::{LocalTarball, LocalTarballFetcher};
use crate::config::PluginConfig;
use crate::error::{PluginError, PluginResult};

/// How to build an [`AutomergePlugin`].
#[derive(Clone, Default)]
pub struct PluginOptions {
    /// An existing store connection to use instead of opening one. The
    /// plugin never shuts down a store it was handed.
    pub store: Option<Arc<dyn DocumentStore>>,
    pub config: PluginConfig,
}

impl std::fmt::Debug for PluginOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginOptions")
            .field("store", &self.store.as_ref().map(|_| "<supplied>"))
            .field("config", &self.config)
            .finish()
    }
}

/// Resolver and fetcher for `automerge:` packages.
///
/// Stateless between calls apart from the shared store client, which is
/// safe to use from many concurrent `resolve` and `fetch` calls.
pub struct AutomergePlugin {
    client: StoreClient,
    config: PluginConfig,
    owns_store: bool,
    shut_down: AtomicBool,
}

impl AutomergePlugin {
    /// Build a plugin, opening a store from `config.store` unless one is
    /// supplied.
    pub fn new(options: PluginOptions) -> PluginResult<Self> {
        let PluginOptions { store, config } = options;
        let (store, owns_store) = match store {
            Some(store) => (store, false),
            None => (connect(&config.store)?, true),
        };
        info!(endpoint = %config.store.endpoint, owns_store, "automerge plugin ready");
        Ok(Self {
            client: StoreClient::from_config(store, &config.store),
            config,
            owns_store,
            shut_down: AtomicBool::new(false),
        })
    }

    /// Build a plugin for a host that only passes configuration. The store
    /// is always owned and released on shutdown.
    pub fn for_host(config: PluginConfig) -> PluginResult<Self> {
        Self::new(PluginOptions { store: None, config })
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    pub fn client(&self) -> &StoreClient {
        &self.client
    }

    pub fn owns_store(&self) -> bool {
        self.owns_store
    }

    // ---- Resolver ----

    /// Returns `true` for specifiers this plugin handles.
    pub fn can_resolve(&self, specifier: &str) -> bool {
        has_scheme(specifier)
    }

    /// Parse a specifier, validating its root with the store's rules.
    pub fn parse(&self, specifier: &str) -> PluginResult<PackageAddress> {
        Ok(PackageAddress::parse_with(specifier, |raw| {
            self.client.is_valid_id(raw)
        })?)
    }

    /// Resolve a specifier to its manifest and cache identity. Touches no
    /// files.
    pub async fn resolve(&self, specifier: &str) -> PluginResult<ResolvedPackage> {
        self.ensure_open()?;
        let address = self.parse(specifier)?;
        Ok(resolve_package(&self.client, &address).await?)
    }

    // ---- Fetcher ----

    /// Returns `true` for resolutions produced by [`resolve`](Self::resolve).
    pub fn can_fetch(&self, resolution: &Resolution) -> bool {
        resolution.is_automerge()
    }

    /// Walk the package and write its files to a fresh temp directory.
    ///
    /// The walk root is derived again from the resolution; nothing from an
    /// earlier `resolve` is reused.
    pub async fn fetch_to_directory(&self, resolution: &Resolution) -> PluginResult<MaterializedPackage> {
        self.ensure_open()?;
        if !self.can_fetch(resolution) {
            return Err(PluginError::UnsupportedResolution(resolution.kind.clone()));
        }
        let address = self.parse(&resolution.automerge_url)?;
        let walk_root = resolve_walk_root(&self.client, &address).await?;
        debug!(address = %address, walk_root = %walk_root, "fetching package");

        let files = TreeWalker::new(self.client.clone())
            .with_fan_out(self.config.store.max_in_flight)
            .walk(&walk_root)
            .await?;
        Ok(materialize(&files, &self.config.pack).await?)
    }

    /// Fetch the package as `package.tgz`.
    pub async fn fetch_to_archive(&self, resolution: &Resolution) -> PluginResult<ArchiveHandle> {
        let package = self.fetch_to_directory(resolution).await?;
        Ok(archive(package).await?)
    }

    /// The host fetcher entry point; same as
    /// [`fetch_to_archive`](Self::fetch_to_archive).
    pub async fn fetch(&self, resolution: &Resolution) -> PluginResult<ArchiveHandle> {
        self.fetch_to_archive(resolution).await
    }

    /// Build the archive and hand it to the host's local-tarball fetcher.
    ///
    /// The archive is released afterwards whether or not the host fetch
    /// succeeded.
    pub async fn fetch_with_cas<F>(
        &self,
        cas: &F::Cas,
        resolution: &Resolution,
        options: &F::Options,
        fetcher: &F,
    ) -> PluginResult<F::Output>
    where
        F: LocalTarballFetcher,
    {
        let mut handle = self.fetch_to_archive(resolution).await?;
        let tarball = LocalTarball::new(handle.archive_path());
        debug!(tarball = %tarball, "delegating to host tarball fetcher");

        let result = fetcher.fetch_local_tarball(cas, &tarball, options).await;
        if let Err(err) = handle.release().await {
            warn!(error = %err, "failed to release archive");
        }
        result.map_err(|e| PluginError::Host(Box::new(e)))
    }

    // ---- Lifecycle ----

    /// Stop the plugin. Cancels in-flight fetches and, if the plugin opened
    /// the store itself, shuts the store down. Only the first call acts.
    pub async fn shutdown(&self) -> PluginResult<()> {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.client.close();
        if self.owns_store {
            self.client.store().shutdown().await?;
        }
        info!(released_store = self.owns_store, "automerge plugin shut down");
        Ok(())
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> PluginResult<()> {
        if self.is_shut_down() {
            return Err(PluginError::ShutDown);
        }
        Ok(())
    }
}

impl std::fmt::Debug for AutomergePlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutomergePlugin")
            .field("endpoint", &self.config.store.endpoint)
            .field("owns_store", &self.owns_store)
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}
