use std::collections::HashMap;
use std::path::{Path, PathBuf};

use amp_store::{DirEntry, DirectoryDocumentStore, FileContent, FileDocument, FolderDocument};
use amp_types::DocumentId;
use anyhow::Context;
use tracing::{debug, warn};
use walkdir::WalkDir;

pub struct ImportSummary {
    pub root: DocumentId,
    pub files: usize,
    pub folders: usize,
}

/// Write `dir` into `store` as folder and file documents.
///
/// Children are stored before their folder, so every folder document is
/// written with final entry ids. Entries are ordered by file name. Symlinks
/// and entries named in `ignore` are skipped.
pub async fn import_dir(store: &DirectoryDocumentStore, dir: &Path, ignore: &[String]) -> anyhow::Result<ImportSummary> {
    let dir = dir
        .canonicalize()
        .with_context(|| format!("cannot import {}", dir.display()))?;
    anyhow::ensure!(dir.is_dir(), "{} is not a directory", dir.display());

    let mut pending: HashMap<PathBuf, Vec<DirEntry>> = HashMap::new();
    let mut summary = ImportSummary {
        root: DocumentId::generate(),
        files: 0,
        folders: 0,
    };

    // Pre-order walk so `filter_entry` prunes ignored directories whole.
    let mut entries = Vec::new();
    let walker = WalkDir::new(&dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !ignore.iter().any(|name| e.file_name() == name.as_str()));
    for entry in walker {
        entries.push(entry.with_context(|| format!("walking {}", dir.display()))?);
    }

    // Reversed pre-order visits every child before its folder. Sibling lists
    // are collected back to front and flipped when the folder is written.
    for entry in entries.iter().rev() {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        let parent = path.parent().unwrap_or(&dir).to_path_buf();

        let dir_entry = if entry.file_type().is_dir() {
            let docs = take_children(&mut pending, path);
            let id = store.insert(FolderDocument::new(name.clone(), docs)).await?;
            summary.folders += 1;
            DirEntry::folder(name, id)
        } else if entry.file_type().is_file() {
            let doc = read_file(path, &name).await?;
            let id = store.insert(doc).await?;
            summary.files += 1;
            DirEntry::file(name, id)
        } else {
            warn!(path = %path.display(), "skipping non-regular file");
            continue;
        };
        debug!(path = %path.display(), id = %dir_entry.url, "imported");
        pending.entry(parent).or_default().push(dir_entry);
    }

    let root_name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let docs = take_children(&mut pending, &dir);
    store.write(&summary.root, FolderDocument::new(root_name, docs)).await?;
    summary.folders += 1;
    Ok(summary)
}

fn take_children(pending: &mut HashMap<PathBuf, Vec<DirEntry>>, dir: &Path) -> Vec<DirEntry> {
    let mut docs = pending.remove(dir).unwrap_or_default();
    docs.reverse();
    docs
}

async fn read_file(path: &Path, name: &str) -> anyhow::Result<FileDocument> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let content = match String::from_utf8(bytes) {
        Ok(text) => FileContent::from(text),
        Err(e) => FileContent::from(e.into_bytes()),
    };
    let doc = FileDocument::new(name, content);

    #[cfg(unix)]
    let doc = {
        use std::os::unix::fs::PermissionsExt;
        let mode = tokio::fs::metadata(path).await?.permissions().mode() & 0o777;
        doc.with_permissions(mode)
    };
    Ok(doc)
}
