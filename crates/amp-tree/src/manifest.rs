use amp_store::{EntryKind, FolderDocument, StoreClient};
use amp_types::DocumentId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{TreeError, TreeResult};

/// Name of the manifest file looked up in a package folder.
pub const MANIFEST_FILE: &str = "package.json";

/// The fields of `package.json` the resolver needs, plus everything else verbatim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PackageManifest {
    pub name: String,
    pub version: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PackageManifest {
    /// Parse manifest text read from document `id`.
    pub fn parse(text: &str, id: &DocumentId) -> TreeResult<Self> {
        serde_json::from_str(text).map_err(|e| TreeError::ManifestParseError {
            id: id.clone(),
            reason: e.to_string(),
        })
    }
}

/// Read and parse `package.json` from the folder at `folder_id`.
pub async fn read_manifest(client: &StoreClient, folder_id: &DocumentId) -> TreeResult<PackageManifest> {
    let folder = client
        .find_folder(folder_id)
        .await
        .map_err(|e| TreeError::from_store(e, ""))?;
    read_manifest_in(client, folder_id, &folder).await
}

/// Read `package.json` from an already fetched folder snapshot.
pub(crate) async fn read_manifest_in(
    client: &StoreClient,
    folder_id: &DocumentId,
    folder: &FolderDocument,
) -> TreeResult<PackageManifest> {
    let entry = folder
        .find(MANIFEST_FILE, EntryKind::File)
        .ok_or_else(|| TreeError::ManifestNotFound { root: folder_id.clone() })?;

    let file = client
        .find_file(&entry.url)
        .await
        .map_err(|e| TreeError::from_store(e, MANIFEST_FILE))?;
    let manifest = PackageManifest::parse(&file.content.as_text(), &entry.url)?;
    debug!(folder = %folder_id, name = %manifest.name, version = %manifest.version, "read manifest");
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use amp_store::{DirEntry, FileDocument, FolderDocument, InMemoryDocumentStore};

    use super::*;
    use crate::testing::{client, setup_simple_package};

    #[tokio::test]
    async fn extracts_name_and_version() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let pkg = setup_simple_package(&store);
        let manifest = read_manifest(&client(&store), &pkg.root).await.unwrap();
        assert_eq!(manifest.name, "my-automerge-pkg");
        assert_eq!(manifest.version, "1.0.0");
        assert_eq!(manifest.extra["main"], "src/index.js");
    }

    #[tokio::test]
    async fn empty_folder_has_no_manifest() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let empty = store.insert(FolderDocument::new("empty", vec![])).unwrap();
        let err = read_manifest(&client(&store), &empty).await.unwrap_err();
        assert!(matches!(err, TreeError::ManifestNotFound { root } if root == empty));
    }

    #[tokio::test]
    async fn folder_named_package_json_is_ignored() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let inner = store.insert(FolderDocument::new("package.json", vec![])).unwrap();
        let root = store
            .insert(FolderDocument::new("root", vec![DirEntry::folder("package.json", inner)]))
            .unwrap();
        let err = read_manifest(&client(&store), &root).await.unwrap_err();
        assert!(matches!(err, TreeError::ManifestNotFound { .. }));
    }

    #[tokio::test]
    async fn malformed_json_is_a_parse_error() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let bad = store.insert(FileDocument::new("package.json", "{ not json")).unwrap();
        let root = store
            .insert(FolderDocument::new("root", vec![DirEntry::file("package.json", bad.clone())]))
            .unwrap();
        let err = read_manifest(&client(&store), &root).await.unwrap_err();
        assert!(matches!(err, TreeError::ManifestParseError { id, .. } if id == bad));
    }

    #[tokio::test]
    async fn missing_version_is_a_parse_error() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let bad = store.insert(FileDocument::new("package.json", r#"{"name":"x"}"#)).unwrap();
        let root = store
            .insert(FolderDocument::new("root", vec![DirEntry::file("package.json", bad)]))
            .unwrap();
        let err = read_manifest(&client(&store), &root).await.unwrap_err();
        assert!(matches!(err, TreeError::ManifestParseError { .. }));
    }

    #[tokio::test]
    async fn binary_manifest_is_decoded() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let bytes = br#"{"name":"bin","version":"0.1.0"}"#.to_vec();
        let file = store.insert(FileDocument::new("package.json", bytes)).unwrap();
        let root = store
            .insert(FolderDocument::new("root", vec![DirEntry::file("package.json", file)]))
            .unwrap();
        let manifest = read_manifest(&client(&store), &root).await.unwrap();
        assert_eq!(manifest.name, "bin");
    }
}
