//! Change-hash bookkeeping for the local backends.
//!
//! Every write records one change whose hash chains the previous heads with
//! the new snapshot, so the heads advance exactly when content is written.

use amp_types::RevisionFingerprint;

use crate::document::Document;
use crate::error::{StoreError, StoreResult};

const CHANGE_DOMAIN: &[u8] = b"amp-change-v1:";

/// Heads after writing `doc` on top of `previous`.
pub fn advance(previous: Option<&RevisionFingerprint>, doc: &Document) -> StoreResult<RevisionFingerprint> {
    let snapshot = serde_json::to_vec(doc).map_err(|e| StoreError::Serialization(e.to_string()))?;

    let mut hasher = blake3::Hasher::new();
    hasher.update(CHANGE_DOMAIN);
    if let Some(prev) = previous {
        for head in prev.heads() {
            hasher.update(head.as_bytes());
            hasher.update(b",");
        }
    }
    hasher.update(b":");
    hasher.update(&snapshot);

    Ok(RevisionFingerprint::from_heads([hex::encode(hasher.finalize().as_bytes())]))
}
