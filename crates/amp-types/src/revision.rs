use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque marker summarizing a document's history at a point in time.
///
/// Backed by the document's heads (the hashes of its most recent changes).
/// Heads are kept sorted so two fingerprints over the same history compare
/// and render identically regardless of the order the store reported them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RevisionFingerprint {
    heads: Vec<String>,
}

impl RevisionFingerprint {
    /// Build a fingerprint from a set of change hashes.
    pub fn from_heads<I, S>(heads: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut heads: Vec<String> = heads.into_iter().map(Into::into).collect();
        heads.sort();
        heads.dedup();
        Self { heads }
    }

    /// The sorted change hashes.
    pub fn heads(&self) -> &[String] {
        &self.heads
    }

    /// Returns `true` for a document with no recorded changes.
    pub fn is_empty(&self) -> bool {
        self.heads.is_empty()
    }
}

impl fmt::Display for RevisionFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.heads.join(","))
    }
}
