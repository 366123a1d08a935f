use amp_store::{DirEntry, EntryKind, StoreClient};
use amp_types::DocumentId;
use bytes::Bytes;
use futures::future::{self, BoxFuture, FutureExt};
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info};

use crate::error::{TreeError, TreeResult};

/// Sibling entries fetched concurrently within one folder.
pub const DEFAULT_FAN_OUT: usize = 8;

/// One file produced by a walk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileEntry {
    /// `/`-joined path from the walk root.
    pub relative_path: String,
    /// File bytes (text content is UTF-8 encoded).
    pub content: Bytes,
    /// Permission bits recorded on the file document, if any.
    pub mode: Option<u32>,
}

/// Flattens a folder subtree into a list of [`FileEntry`] values.
///
/// Output order is depth-first pre-order following each folder's entry
/// order, so archive layout is deterministic for a given graph. Siblings are
/// fetched concurrently (up to the fan-out) and reassembled in order.
///
/// A missing document anywhere fails the whole walk: a package resolves
/// completely or not at all. A folder that reappears among its own
/// ancestors fails with [`TreeError::CyclicGraph`].
#[derive(Clone, Debug)]
pub struct TreeWalker {
    client: StoreClient,
    fan_out: usize,
}

impl TreeWalker {
    pub fn new(client: StoreClient) -> Self {
        Self {
            client,
            fan_out: DEFAULT_FAN_OUT,
        }
    }

    /// Override how many siblings are fetched at once.
    #[must_use]
    pub fn with_fan_out(mut self, fan_out: usize) -> Self {
        self.fan_out = fan_out.max(1);
        self
    }

    /// Walk the folder at `root` and return every file beneath it.
    pub async fn walk(&self, root: &DocumentId) -> TreeResult<Vec<FileEntry>> {
        let files = self
            .walk_folder(root.clone(), String::new(), vec![root.clone()])
            .await?;
        info!(root = %root, files = files.len(), "walked folder tree");
        Ok(files)
    }

    fn walk_folder(
        &self,
        id: DocumentId,
        base: String,
        ancestors: Vec<DocumentId>,
    ) -> BoxFuture<'_, TreeResult<Vec<FileEntry>>> {
        async move {
            let folder = self
                .client
                .find_folder(&id)
                .await
                .map_err(|e| TreeError::from_store(e, &base))?;
            debug!(id = %id, path = %base, entries = folder.len(), "read folder");

            let children = folder
                .docs
                .into_iter()
                .map(|entry| self.visit(entry, &base, &ancestors));

            let nested: Vec<Vec<FileEntry>> = stream::iter(children)
                .buffered(self.fan_out)
                .try_collect()
                .await?;
            Ok(nested.into_iter().flatten().collect())
        }
        .boxed()
    }

    fn visit(
        &self,
        entry: DirEntry,
        base: &str,
        ancestors: &[DocumentId],
    ) -> BoxFuture<'_, TreeResult<Vec<FileEntry>>> {
        let path = join(base, &entry.name);
        match entry.kind {
            EntryKind::Folder if ancestors.contains(&entry.url) => {
                future::ready(Err(TreeError::CyclicGraph { id: entry.url, path })).boxed()
            }
            EntryKind::Folder => {
                let mut ancestors = ancestors.to_vec();
                ancestors.push(entry.url.clone());
                self.walk_folder(entry.url, path, ancestors)
            }
            EntryKind::File => self
                .read_file(entry.url, path)
                .map(|file| file.map(|f| vec![f]))
                .boxed(),
        }
    }

    async fn read_file(&self, id: DocumentId, path: String) -> TreeResult<FileEntry> {
        let file = self
            .client
            .find_file(&id)
            .await
            .map_err(|e| TreeError::from_store(e, &path))?;
        let mode = file.permissions();
        Ok(FileEntry {
            relative_path: path,
            content: file.content.into_bytes(),
            mode,
        })
    }
}

fn join(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{base}/{name}")
    }
}
