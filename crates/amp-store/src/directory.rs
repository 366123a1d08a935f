use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use amp_types::{DocumentId, RevisionFingerprint};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::document::Document;
use crate::error::{StoreError, StoreResult};
use crate::history;
use crate::traits::{DocumentHandle, DocumentStore};

/// On-disk record: one per document.
#[derive(Serialize, Deserialize)]
struct DocumentRecord {
    heads: Vec<String>,
    doc: Document,
}

/// Document store backed by a local directory.
///
/// Each document lives in `<root>/<suffix>.json`, where `suffix` is the
/// identifier without its scheme prefix. Useful for offline installs and for
/// seeding packages from a working tree.
#[derive(Debug)]
pub struct DirectoryDocumentStore {
    root: PathBuf,
    closed: AtomicBool,
}

impl DirectoryDocumentStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            closed: AtomicBool::new(false),
        })
    }

    /// The directory holding the document records.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, id: &DocumentId) -> Option<PathBuf> {
        // Identifiers read back from folder documents are not validated on
        // deserialization; anything that is not a plain suffix never maps to a file.
        DocumentId::is_valid(id.as_str()).then(|| self.root.join(format!("{}.json", id.suffix())))
    }

    async fn read_record(&self, id: &DocumentId) -> StoreResult<Option<DocumentRecord>> {
        let Some(path) = self.record_path(id) else {
            return Ok(None);
        };
        match tokio::fs::read(&path).await {
            Ok(data) => serde_json::from_slice(&data)
                .map(Some)
                .map_err(|e| StoreError::Serialization(format!("{}: {e}", path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write a document under `id`, returning its new heads.
    pub async fn write(&self, id: &DocumentId, doc: impl Into<Document>) -> StoreResult<RevisionFingerprint> {
        let path = self
            .record_path(id)
            .ok_or_else(|| StoreError::Serialization(format!("cannot store document {id}")))?;
        let doc = doc.into();

        let previous = self
            .read_record(id)
            .await?
            .map(|r| RevisionFingerprint::from_heads(r.heads));
        let heads = history::advance(previous.as_ref(), &doc)?;

        let record = DocumentRecord {
            heads: heads.heads().to_vec(),
            doc,
        };
        let data = serde_json::to_vec_pretty(&record).map_err(|e| StoreError::Serialization(e.to_string()))?;

        let root = self.root.clone();
        let target = path.clone();
        tokio::task::spawn_blocking(move || -> StoreResult<()> {
            let mut staged = tempfile::NamedTempFile::new_in(&root)?;
            staged.write_all(&data)?;
            staged.persist(&target).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| StoreError::Io(std::io::Error::other(e)))??;
        debug!(id = %id, path = %path.display(), "wrote document");
        Ok(heads)
    }

    /// Write a document under a freshly minted identifier.
    pub async fn insert(&self, doc: impl Into<Document>) -> StoreResult<DocumentId> {
        let id = DocumentId::generate();
        self.write(&id, doc).await?;
        Ok(id)
    }
}

#[async_trait]
impl DocumentStore for DirectoryDocumentStore {
    async fn find(&self, id: &DocumentId, cancel: &CancellationToken) -> StoreResult<DocumentHandle> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(StoreError::Closed);
        }
        let record = tokio::select! {
            _ = cancel.cancelled() => return Err(StoreError::Cancelled(id.clone())),
            record = self.read_record(id) => record?,
        };
        let record = record.ok_or_else(|| StoreError::NotFound(id.clone()))?;
        Ok(DocumentHandle::new(
            id.clone(),
            record.doc,
            RevisionFingerprint::from_heads(record.heads),
        ))
    }

    async fn shutdown(&self) -> StoreResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DirEntry, FileDocument, FolderDocument};

    #[tokio::test]
    async fn write_then_find() {
        let tmp = tempfile::tempdir().unwrap();
        let store = DirectoryDocumentStore::open(tmp.path()).unwrap();

        let file = store.insert(FileDocument::new("a.txt", "hi").with_permissions(0o600)).await.unwrap();
        let root = store
            .insert(FolderDocument::new("root", vec![DirEntry::file("a.txt", file.clone())]))
            .await
            .unwrap();

        assert!(tmp.path().join(format!("{}.json", root.suffix())).exists());

        let folder = store.find(&root, &CancellationToken::new()).await.unwrap().into_folder().unwrap();
        assert_eq!(folder.docs[0].url, file);

        let file = store.find(&file, &CancellationToken::new()).await.unwrap().into_file().unwrap();
        assert_eq!(file.permissions(), Some(0o600));
    }

    #[tokio::test]
    async fn rewrite_advances_heads() {
        let tmp = tempfile::tempdir().unwrap();
        let store = DirectoryDocumentStore::open(tmp.path()).unwrap();
        let id = DocumentId::parse("automerge:fixed").unwrap();

        let first = store.write(&id, FileDocument::new("a", "1")).await.unwrap();
        let second = store.write(&id, FileDocument::new("a", "2")).await.unwrap();
        assert_ne!(first, second);

        let handle = store.find(&id, &CancellationToken::new()).await.unwrap();
        assert_eq!(handle.heads(), &second);
    }

    #[tokio::test]
    async fn concurrent_writes_to_one_id_all_land() {
        let tmp = tempfile::tempdir().unwrap();
        let store = std::sync::Arc::new(DirectoryDocumentStore::open(tmp.path()).unwrap());
        let id = DocumentId::parse("automerge:shared").unwrap();

        let writes: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                let id = id.clone();
                tokio::spawn(async move { store.write(&id, FileDocument::new("a", i.to_string())).await })
            })
            .collect();
        for write in writes {
            write.await.unwrap().unwrap();
        }

        let file = store.find(&id, &CancellationToken::new()).await.unwrap().into_file().unwrap();
        assert_eq!(file.name, "a");
        let leftovers: Vec<_> = std::fs::read_dir(tmp.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.path().extension().map_or(true, |ext| ext != "json"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn missing_and_unsafe_ids_are_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let store = DirectoryDocumentStore::open(tmp.path()).unwrap();

        let missing = DocumentId::parse("automerge:missing").unwrap();
        let err = store.find(&missing, &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));

        let traversal: DocumentId = serde_json::from_str("\"automerge:../etc\"").unwrap();
        let err = store.find(&traversal, &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn shutdown_rejects_finds() {
        let tmp = tempfile::tempdir().unwrap();
        let store = DirectoryDocumentStore::open(tmp.path()).unwrap();
        let id = store.insert(FileDocument::new("a", "x")).await.unwrap();
        store.shutdown().await.unwrap();
        let err = store.find(&id, &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::Closed));
    }
}
