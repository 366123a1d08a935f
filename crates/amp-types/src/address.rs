//! Package specifier parsing.
//!
//! A specifier has the shape `automerge:<id>[/<subpath>]`. The first `/`
//! strictly after the scheme prefix separates the root document from the
//! subpath; nothing inside the prefix ever triggers a split.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::id::{DocumentId, SCHEME_PREFIX};

/// A parsed package specifier: the root folder document plus an optional
/// `/`-delimited subpath naming a nested folder.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageAddress {
    root: DocumentId,
    subpath: Option<String>,
}

impl PackageAddress {
    /// Parse a specifier using the default document-id validity rule.
    pub fn parse(specifier: &str) -> Result<Self, TypeError> {
        Self::parse_with(specifier, DocumentId::is_valid)
    }

    /// Parse a specifier, validating the root with the store's predicate.
    pub fn parse_with(
        specifier: &str,
        is_valid: impl Fn(&str) -> bool,
    ) -> Result<Self, TypeError> {
        let split_at = specifier
            .get(SCHEME_PREFIX.len()..)
            .and_then(|rest| rest.find('/'))
            .map(|i| i + SCHEME_PREFIX.len());

        let (root, subpath) = match split_at {
            Some(i) => (&specifier[..i], normalize_subpath(&specifier[i + 1..])),
            None => (specifier, None),
        };

        let root = DocumentId::parse_with(root, is_valid)
            .map_err(|_| TypeError::InvalidAddress(root.to_string()))?;

        Ok(Self { root, subpath })
    }

    /// Build an address from parts. An empty or all-slash subpath is dropped.
    pub fn new(root: DocumentId, subpath: Option<&str>) -> Self {
        Self {
            root,
            subpath: subpath.and_then(normalize_subpath),
        }
    }

    /// The root folder document.
    pub fn root(&self) -> &DocumentId {
        &self.root
    }

    /// The normalized subpath, if any.
    pub fn subpath(&self) -> Option<&str> {
        self.subpath.as_deref()
    }

    /// Subpath segments in order; empty when there is no subpath.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.subpath.iter().flat_map(|s| s.split('/'))
    }

    /// The canonical specifier string (`<root>[/<subpath>]`).
    pub fn full_address(&self) -> String {
        match &self.subpath {
            Some(sub) => format!("{}/{}", self.root, sub),
            None => self.root.to_string(),
        }
    }
}

impl fmt::Display for PackageAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_address())
    }
}

/// Returns `true` if the specifier uses the package scheme.
pub fn has_scheme(specifier: &str) -> bool {
    specifier.starts_with(SCHEME_PREFIX)
}

fn normalize_subpath(raw: &str) -> Option<String> {
    let joined = raw
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    (!joined.is_empty()).then_some(joined)
}
