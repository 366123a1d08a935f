#![allow(dead_code)]

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use amp_plugin::{AutomergePlugin, PluginConfig, PluginOptions};
use amp_store::{DirEntry, FileDocument, FolderDocument, InMemoryDocumentStore};
use amp_types::DocumentId;
use flate2::read::GzDecoder;

pub struct Fixture {
    pub store: Arc<InMemoryDocumentStore>,
    pub plugin: AutomergePlugin,
    pub temp_root: tempfile::TempDir,
}

pub struct Package {
    pub root: DocumentId,
    pub src: DocumentId,
    pub index_js: DocumentId,
    pub readme: DocumentId,
}

/// A plugin over a supplied in-memory store, with temp dirs kept under a
/// directory the test can inspect.
pub fn fixture() -> Fixture {
    fixture_with(|_| {})
}

pub fn fixture_with(tweak: impl FnOnce(&mut PluginConfig)) -> Fixture {
    let store = Arc::new(InMemoryDocumentStore::new());
    let temp_root = tempfile::tempdir().unwrap();
    let mut config = PluginConfig::default();
    config.store.timeout_ms = 2_000;
    config.pack.temp_root = Some(temp_root.path().to_path_buf());
    tweak(&mut config);

    let plugin = AutomergePlugin::new(PluginOptions {
        store: Some(store.clone()),
        config,
    })
    .unwrap();
    Fixture {
        store,
        plugin,
        temp_root,
    }
}

impl Fixture {
    /// Number of fetch temp directories still on disk.
    pub fn leftover_temp_dirs(&self) -> usize {
        std::fs::read_dir(self.temp_root.path()).unwrap().count()
    }
}

/// root/
///   package.json  {"name":"p","version":"1.0.0"}
///   src/index.js
///   README.md
pub fn seed_package(store: &InMemoryDocumentStore) -> Package {
    let manifest = store
        .insert(FileDocument::new("package.json", r#"{"name":"p","version":"1.0.0"}"#))
        .unwrap();
    let index_js = store
        .insert(FileDocument::new("index.js", "module.exports = 42;\n").with_permissions(0o644))
        .unwrap();
    let readme = store.insert(FileDocument::new("README.md", "# p\n")).unwrap();
    let src = store
        .insert(FolderDocument::new("src", vec![DirEntry::file("index.js", index_js.clone())]))
        .unwrap();
    let root = store
        .insert(FolderDocument::new(
            "p",
            vec![
                DirEntry::file("package.json", manifest),
                DirEntry::folder("src", src.clone()),
                DirEntry::file("README.md", readme.clone()),
            ],
        ))
        .unwrap();
    Package {
        root,
        src,
        index_js,
        readme,
    }
}

/// root/
///   package.json  (outer 0.1.0)
///   LICENSE
///   packages/
///     core/
///       package.json  (core 3.0.0)
///       lib/main.js
pub fn seed_monorepo(store: &InMemoryDocumentStore) -> DocumentId {
    let core_manifest = store
        .insert(FileDocument::new("package.json", r#"{"name":"core","version":"3.0.0"}"#))
        .unwrap();
    let main_js = store.insert(FileDocument::new("main.js", "export const core = true;\n")).unwrap();
    let lib = store
        .insert(FolderDocument::new("lib", vec![DirEntry::file("main.js", main_js)]))
        .unwrap();
    let core = store
        .insert(FolderDocument::new(
            "core",
            vec![DirEntry::file("package.json", core_manifest), DirEntry::folder("lib", lib)],
        ))
        .unwrap();
    let packages = store
        .insert(FolderDocument::new("packages", vec![DirEntry::folder("core", core)]))
        .unwrap();
    let outer_manifest = store
        .insert(FileDocument::new("package.json", r#"{"name":"outer","version":"0.1.0"}"#))
        .unwrap();
    let license = store.insert(FileDocument::new("LICENSE", "MIT\n")).unwrap();
    store
        .insert(FolderDocument::new(
            "outer",
            vec![
                DirEntry::file("package.json", outer_manifest),
                DirEntry::file("LICENSE", license),
                DirEntry::folder("packages", packages),
            ],
        ))
        .unwrap()
}

/// Every entry of a gzip tarball as `(path, bytes)`, in archive order.
pub fn read_tarball(path: &Path) -> Vec<(String, Vec<u8>)> {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = tar::Archive::new(GzDecoder::new(file));
    archive
        .entries()
        .unwrap()
        .map(|entry| {
            let mut entry = entry.unwrap();
            let name = entry.path().unwrap().to_string_lossy().into_owned();
            let mut body = Vec::new();
            entry.read_to_end(&mut body).unwrap();
            (name, body)
        })
        .collect()
}

pub fn names(entries: &[(String, Vec<u8>)]) -> Vec<&str> {
    entries.iter().map(|(n, _)| n.as_str()).collect()
}
