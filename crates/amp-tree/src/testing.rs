//! Shared document-graph fixtures for unit tests.

use std::sync::Arc;
use std::time::Duration;

use amp_store::{DirEntry, FileDocument, FolderDocument, InMemoryDocumentStore, StoreClient};
use amp_types::DocumentId;

pub struct SimplePackage {
    pub root: DocumentId,
    pub package_json: DocumentId,
    pub src: DocumentId,
    pub index_js: DocumentId,
    pub readme: DocumentId,
}

pub struct SubpathPackage {
    pub root: DocumentId,
    pub dist: DocumentId,
}

pub fn client(store: &Arc<InMemoryDocumentStore>) -> StoreClient {
    StoreClient::new(store.clone(), Duration::from_secs(5), 8)
}

fn id(suffix: &str) -> DocumentId {
    DocumentId::parse(&format!("automerge:{suffix}")).unwrap()
}

/// root/
///   package.json
///   src/index.js
///   README.md
pub fn setup_simple_package(store: &InMemoryDocumentStore) -> SimplePackage {
    let pkg = SimplePackage {
        root: id("rootDoc123"),
        package_json: id("pkgJsonDoc"),
        src: id("srcFolder"),
        index_js: id("indexJs"),
        readme: id("readmeDoc"),
    };

    let manifest = r#"{"name":"my-automerge-pkg","version":"1.0.0","main":"src/index.js"}"#;
    store.put(&pkg.package_json, FileDocument::new("package.json", manifest).with_permissions(0o644)).unwrap();
    store
        .put(&pkg.index_js, FileDocument::new("index.js", "module.exports = { hello: \"world\" }\n").with_permissions(0o644))
        .unwrap();
    store
        .put(&pkg.readme, FileDocument::new("README.md", "# My Package\n\nHello from automerge!\n").with_permissions(0o644))
        .unwrap();
    store
        .put(&pkg.src, FolderDocument::new("src", vec![DirEntry::file("index.js", pkg.index_js.clone())]))
        .unwrap();
    store
        .put(
            &pkg.root,
            FolderDocument::new(
                "my-automerge-pkg",
                vec![
                    DirEntry::file("package.json", pkg.package_json.clone()),
                    DirEntry::folder("src", pkg.src.clone()),
                    DirEntry::file("README.md", pkg.readme.clone()),
                ],
            ),
        )
        .unwrap();
    pkg
}

/// root/
///   package.json   (subpath-pkg 2.0.0)
///   dist/
///     package.json (subpath-pkg 2.0.0, main index.js)
///     index.js
pub fn setup_package_with_subpath(store: &InMemoryDocumentStore) -> SubpathPackage {
    let pkg = SubpathPackage {
        root: id("subpathRoot"),
        dist: id("distFolder"),
    };
    let root_manifest = id("subpathPkgJson");
    let dist_manifest = id("distPkgJson");
    let dist_index = id("distIndex");

    store
        .put(&root_manifest, FileDocument::new("package.json", r#"{"name":"subpath-pkg","version":"2.0.0"}"#))
        .unwrap();
    store
        .put(
            &dist_manifest,
            FileDocument::new("package.json", r#"{"name":"subpath-pkg","version":"2.0.0","main":"index.js"}"#),
        )
        .unwrap();
    store
        .put(&dist_index, FileDocument::new("index.js", "export default \"from dist\"\n"))
        .unwrap();
    store
        .put(
            &pkg.dist,
            FolderDocument::new(
                "dist",
                vec![
                    DirEntry::file("package.json", dist_manifest),
                    DirEntry::file("index.js", dist_index),
                ],
            ),
        )
        .unwrap();
    store
        .put(
            &pkg.root,
            FolderDocument::new(
                "subpath-pkg",
                vec![
                    DirEntry::file("package.json", root_manifest),
                    DirEntry::folder("dist", pkg.dist.clone()),
                ],
            ),
        )
        .unwrap();
    pkg
}
