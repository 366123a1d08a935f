use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The URL scheme every package specifier and document identifier carries.
pub const SCHEME_PREFIX: &str = "automerge:";

/// Identifier of a document in the store.
///
/// A `DocumentId` is the full scheme-qualified URL (`automerge:<suffix>`).
/// The default validity rule accepts a non-empty ASCII-alphanumeric suffix;
/// stores with stricter syntax supply their own predicate through
/// [`DocumentId::parse_with`].
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Parse with the default validity rule.
    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        Self::parse_with(raw, Self::is_valid)
    }

    /// Parse with a caller-supplied validity predicate.
    pub fn parse_with(raw: &str, is_valid: impl Fn(&str) -> bool) -> Result<Self, TypeError> {
        if !is_valid(raw) {
            return Err(TypeError::InvalidDocumentId(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    /// Default validity rule: `automerge:` followed by one or more ASCII
    /// alphanumerics.
    pub fn is_valid(raw: &str) -> bool {
        match raw.strip_prefix(SCHEME_PREFIX) {
            Some(suffix) => !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_alphanumeric()),
            None => false,
        }
    }

    /// Mint a fresh identifier (UUIDv7, simple hex).
    pub fn generate() -> Self {
        Self(format!("{SCHEME_PREFIX}{}", uuid::Uuid::now_v7().simple()))
    }

    /// The full URL string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part after the scheme prefix.
    pub fn suffix(&self) -> &str {
        self.0.strip_prefix(SCHEME_PREFIX).unwrap_or(&self.0)
    }
}

impl fmt::Debug for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentId({})", self.0)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
