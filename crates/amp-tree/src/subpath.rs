//! Subpath resolution: follow folder names from a root down to a nested folder.
//!
//! Resolution is never cached. The graph may change between calls, so every
//! resolve and every fetch walks the subpath again.

use amp_store::{EntryKind, StoreClient};
use amp_types::{DocumentId, PackageAddress};
use tracing::debug;

use crate::error::{TreeError, TreeResult};

/// Follow `subpath` from `root`, returning the identifier of the final folder.
///
/// Each segment must name a direct `folder` entry of the current folder;
/// the first matching entry wins.
pub async fn resolve_subpath(
    client: &StoreClient,
    root: &DocumentId,
    subpath: &str,
) -> TreeResult<DocumentId> {
    let mut current = root.clone();
    let mut walked = String::new();

    for segment in subpath.split('/').filter(|s| !s.is_empty()) {
        let folder = client
            .find_folder(&current)
            .await
            .map_err(|e| TreeError::from_store(e, &walked))?;

        let entry = folder
            .find(segment, EntryKind::Folder)
            .ok_or_else(|| TreeError::SubpathNotFound {
                segment: segment.to_string(),
                subpath: subpath.to_string(),
                folder: current.clone(),
            })?;

        if !walked.is_empty() {
            walked.push('/');
        }
        walked.push_str(segment);
        current = entry.url.clone();
    }

    debug!(root = %root, subpath, target = %current, "resolved subpath");
    Ok(current)
}

/// The folder a fetch of `address` should walk: the root itself, or the
/// folder its subpath names.
pub async fn resolve_walk_root(client: &StoreClient, address: &PackageAddress) -> TreeResult<DocumentId> {
    match address.subpath() {
        Some(subpath) => resolve_subpath(client, address.root(), subpath).await,
        None => Ok(address.root().clone()),
    }
}
